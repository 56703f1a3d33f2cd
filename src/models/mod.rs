//! Domain models for berth.
//!
//! # Core Concepts
//!
//! ## Hierarchy Entities
//!
//! Four nested organizational levels, each owning the one below it:
//!
//! - [`Ecosystem`]: Top-level grouping (e.g., "work", "personal").
//! - [`Domain`]: Intermediate grouping within an ecosystem.
//! - [`App`]: Leaf organizational node; owns workspaces.
//! - [`Workspace`]: A named, isolated development environment backed by one
//!   container.
//!
//! ## Catalog Entities
//!
//! Global libraries independent of the hierarchy, referenced by name from
//! workspaces:
//!
//! - [`CatalogEntry`]: One Neovim plugin, theme, or terminal package, tagged
//!   by [`Catalog`].
//!
//! ## Context
//!
//! - [`ActiveContext`]: The persisted "current selection" at each hierarchy
//!   level, stored as a singleton row and loaded/saved explicitly (never held
//!   as ambient global state).

mod catalog;
mod context;
mod ecosystem;
mod workspace;

pub use catalog::*;
pub use context::*;
pub use ecosystem::*;
pub use workspace::*;
