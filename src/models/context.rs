use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The persisted "current selection" at each hierarchy level.
///
/// Stored as a singleton row and loaded/saved explicitly by the context
/// resolver. Invariant: a null ecosystem forces null domain, app, and
/// workspace; a null domain forces null app and workspace; a null app forces
/// null workspace. The resolver enforces this on every mutation rather than
/// assuming stored rows are already consistent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveContext {
    pub ecosystem_id: Option<Uuid>,
    pub domain_id: Option<Uuid>,
    pub app_id: Option<Uuid>,
    pub workspace_id: Option<Uuid>,
}

impl ActiveContext {
    /// The active id for one level.
    pub fn get(&self, level: ContextLevel) -> Option<Uuid> {
        match level {
            ContextLevel::Ecosystem => self.ecosystem_id,
            ContextLevel::Domain => self.domain_id,
            ContextLevel::App => self.app_id,
            ContextLevel::Workspace => self.workspace_id,
        }
    }
}

/// One of the four hierarchy levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ContextLevel {
    Ecosystem,
    Domain,
    App,
    Workspace,
}

impl ContextLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ecosystem => "ecosystem",
            Self::Domain => "domain",
            Self::App => "app",
            Self::Workspace => "workspace",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ecosystem" | "eco" => Some(Self::Ecosystem),
            "domain" => Some(Self::Domain),
            "app" => Some(Self::App),
            "workspace" | "ws" => Some(Self::Workspace),
            _ => None,
        }
    }

    /// Levels strictly below this one, outermost first. Used for cascade
    /// clears.
    pub fn descendants(&self) -> &'static [ContextLevel] {
        match self {
            Self::Ecosystem => &[Self::Domain, Self::App, Self::Workspace],
            Self::Domain => &[Self::App, Self::Workspace],
            Self::App => &[Self::Workspace],
            Self::Workspace => &[],
        }
    }
}

impl std::fmt::Display for ContextLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
