//! Typed errors shared across the crate.
//!
//! The core never prints; every failure surfaces as one of these variants and
//! the binary decides presentation. Precondition errors (`NoActiveContext`,
//! `NoPlatformDetected`) carry actionable hint text naming the command that
//! establishes the missing precondition.

use thiserror::Error;

use crate::models::ContextLevel;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Entity, plugin, or container absent. Recoverable; surfaced as a hint.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// Duplicate create. The user must rename or delete the existing entity.
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    /// No explicit target and nothing active at the required level.
    #[error("no active {level}; run `berth use {level} <name>` or pass an explicit name")]
    NoActiveContext { level: ContextLevel },

    /// No reachable container platform on the host.
    #[error("no supported container platform detected; install and start one of: Rancher Desktop, Lima, Colima, Podman, Docker")]
    NoPlatformDetected,

    /// A resource kind with no registered handler. Assembly defect, not a
    /// user error.
    #[error("unsupported resource kind '{0}'")]
    UnsupportedKind(String),

    /// The handler for this kind does not implement the requested operation.
    #[error("operation '{operation}' is not supported for kind '{kind}'")]
    NotSupported {
        kind: String,
        operation: &'static str,
    },

    /// Platform unreachable or timed out. Never retried automatically.
    #[error("container platform communication failed: {0}")]
    RuntimeCommunication(String),

    #[error(transparent)]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::RuntimeCommunication(msg.into())
    }
}
