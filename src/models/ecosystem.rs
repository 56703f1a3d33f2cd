use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The top-level grouping of the hierarchy.
///
/// An ecosystem collects related domains (e.g., an employer, a client, or
/// "personal"). Deleting an ecosystem cascades through its domains, apps,
/// and workspaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ecosystem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An intermediate grouping within an ecosystem.
///
/// Domain names are unique within their ecosystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: Uuid,
    pub ecosystem_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A leaf organizational node under a domain.
///
/// Apps own workspaces; a workspace's container name is derived from its
/// owning app's name plus its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub id: Uuid,
    pub domain_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new ecosystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEcosystemInput {
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating an existing ecosystem. All fields are optional for partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEcosystemInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Input for creating a new domain under an ecosystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDomainInput {
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating an existing domain. All fields are optional for partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDomainInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Input for creating a new app under a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppInput {
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating an existing app. All fields are optional for partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppInput {
    pub name: Option<String>,
    pub description: Option<String>,
}
