use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which global catalog an entry belongs to.
///
/// The three catalogs share one shape (named entries with an optional source
/// URL) but are stored and listed independently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Catalog {
    NvimPlugin,
    Theme,
    TerminalPackage,
}

impl Catalog {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NvimPlugin => "nvim_plugin",
            Self::Theme => "theme",
            Self::TerminalPackage => "terminal_package",
        }
    }

    /// Human-readable singular noun, used in error messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::NvimPlugin => "nvim plugin",
            Self::Theme => "theme",
            Self::TerminalPackage => "terminal package",
        }
    }
}

/// One entry in a global catalog (a Neovim plugin, theme, or terminal
/// package).
///
/// Catalog entries live outside the hierarchy and are referenced by name
/// from workspaces (the plugin set) or from user configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub name: String,
    /// Source repository URL (e.g., `https://github.com/folke/lazy.nvim`).
    pub url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCatalogEntryInput {
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
}
