//! Workspace plugin set management.
//!
//! Pure logic over the denormalized, comma-joined plugin-name set stored on
//! a [`Workspace`]. Nothing here touches storage; callers persist the
//! mutated workspace afterward (`Database::save_workspace_plugins`).
//!
//! The stored field distinguishes `None` ("no explicit override, builds use
//! the full global library") from `Some("")` ("explicitly empty"). List
//! output preserves insertion order, not lexical order.

use serde::Serialize;

use crate::models::{NvimStructure, Workspace};

/// Per-item outcome of a multi-name add. Nothing aborts a bulk mutation;
/// every requested name lands in exactly one bucket.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddOutcome {
    /// Valid and newly inserted, in first-seen request order.
    pub added: Vec<String>,
    /// Valid but already present in the workspace's set.
    pub skipped: Vec<String>,
    /// Not present in the global plugin library.
    pub not_found: Vec<String>,
}

/// Per-item outcome of a multi-name remove.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemoveOutcome {
    pub removed: Vec<String>,
    /// Requested but not currently in the set. Removing from an
    /// unconfigured workspace puts every name here; it is not an error.
    pub not_found: Vec<String>,
}

/// The configured plugin names, in the order they were added. An absent or
/// empty field yields an empty list.
pub fn list_plugins(ws: &Workspace) -> Vec<String> {
    parse_set(ws.plugins.as_deref())
}

/// Add `requested` names to the workspace's set, validated against the
/// global library.
///
/// Duplicates within `requested` collapse to their first occurrence. The
/// first customization of an unmarked workspace flips its generation marker
/// to [`NvimStructure::Custom`].
pub fn add_plugins(ws: &mut Workspace, requested: &[String], global: &[String]) -> AddOutcome {
    let mut current = parse_set(ws.plugins.as_deref());
    let mut outcome = AddOutcome::default();

    for name in requested {
        if outcome.added.contains(name) {
            continue;
        }
        if !global.iter().any(|g| g == name) {
            if !outcome.not_found.contains(name) {
                outcome.not_found.push(name.clone());
            }
        } else if current.contains(name) {
            if !outcome.skipped.contains(name) {
                outcome.skipped.push(name.clone());
            }
        } else {
            current.push(name.clone());
            outcome.added.push(name.clone());
        }
    }

    if !outcome.added.is_empty() {
        ws.plugins = Some(current.join(","));
        if ws.nvim_structure.is_none() {
            ws.nvim_structure = Some(NvimStructure::Custom);
        }
    }

    outcome
}

/// Remove `names` from the workspace's set.
///
/// An unconfigured workspace (absent or empty set) reports every name as
/// `not_found`; the stored field is left untouched so `None` stays `None`.
pub fn remove_plugins(ws: &mut Workspace, names: &[String]) -> RemoveOutcome {
    let current = parse_set(ws.plugins.as_deref());
    let mut outcome = RemoveOutcome::default();

    for name in names {
        if outcome.removed.contains(name) || outcome.not_found.contains(name) {
            continue;
        }
        if current.contains(name) {
            outcome.removed.push(name.clone());
        } else {
            outcome.not_found.push(name.clone());
        }
    }

    if !outcome.removed.is_empty() {
        let remaining: Vec<String> = current
            .into_iter()
            .filter(|n| !outcome.removed.contains(n))
            .collect();
        ws.plugins = Some(remaining.join(","));
    }

    outcome
}

/// Empty the workspace's set and return how many names were removed.
///
/// The result is always the explicit empty set `Some("")`, never `None`;
/// a clear is a customization, not a reset to "inherit everything".
/// Clearing an already-empty set returns 0 and is not an error.
pub fn clear_plugins(ws: &mut Workspace) -> usize {
    let count = parse_set(ws.plugins.as_deref()).len();
    ws.plugins = Some(String::new());
    count
}

fn parse_set(stored: Option<&str>) -> Vec<String> {
    stored
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
