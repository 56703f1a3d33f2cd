use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An isolated development environment backed by one container.
///
/// Workspaces belong to exactly one [`crate::models::App`]; their names are
/// unique within that app. The `plugins` field is a denormalized,
/// comma-joined set of Neovim plugin names selected from the global plugin
/// catalog. `None` means "no explicit override — builds use the full global
/// library"; `Some("")` means "explicitly empty". The two are distinct and
/// must never be collapsed into each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    pub app_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Container image reference (e.g., `ubuntu:24.04`).
    pub image: String,
    /// Last recorded lifecycle status, as reported by the container platform.
    pub status: String,
    /// Comma-joined configured plugin-name set. See the struct docs for the
    /// `None` vs `Some("")` distinction.
    pub plugins: Option<String>,
    /// How the workspace's Neovim configuration is generated. Unset until
    /// the first plugin customization.
    pub nvim_structure: Option<NvimStructure>,
    pub created_at: DateTime<Utc>,
}

/// How a workspace's Neovim configuration tree is generated.
///
/// - `Default`: the stock generated configuration
/// - `Custom`: the workspace has customized its plugin set; generation
///   respects the configured subset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NvimStructure {
    Default,
    Custom,
}

impl NvimStructure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "default" => Some(Self::Default),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Input for creating a new workspace under an app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkspaceInput {
    pub name: String,
    pub description: Option<String>,
    pub image: String,
}

/// Input for updating an existing workspace. All fields are optional for partial updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWorkspaceInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub status: Option<String>,
}
