//! berth: a containerized development workspace manager.
//!
//! Workspaces live under a four-level hierarchy (Ecosystem → Domain → App →
//! Workspace) with a persisted "active" selection at each level. Auxiliary
//! resources (Neovim plugins, themes, terminal packages) sit outside the
//! hierarchy in global catalogs and are operated on through one polymorphic
//! dispatch path.
//!
//! The library returns structured data and typed errors; the `berth` binary
//! owns argument parsing and presentation.

pub mod context;
pub mod db;
pub mod error;
pub mod models;
pub mod output;
pub mod platform;
pub mod plugins;
pub mod registry;
pub mod runtime;

pub use error::{Error, Result};
