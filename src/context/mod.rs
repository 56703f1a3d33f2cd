//! Active-context resolution and cascade invariants.
//!
//! Every command that operates on a hierarchy level funnels through
//! [`Resolver::resolve`], which applies one fixed precedence:
//! explicit argument > flag > persisted active context > environment
//! override. Mutations go through [`Resolver::set_active`] /
//! [`Resolver::clear_active`], which enforce the cascade invariant (a
//! cleared or replaced level nulls everything strictly below it).

use uuid::Uuid;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{App, ContextLevel, Domain, Ecosystem, Workspace};

/// The user-facing sentinel that clears a level instead of naming an entity.
///
/// `berth use workspace none` routes to [`Resolver::clear_active`] rather
/// than being treated as a literal workspace name.
pub const CLEAR_SENTINEL: &str = "none";

/// Environment variable consulted as the last fallback for the active app.
pub const ENV_APP: &str = "BERTH_APP";
/// Environment variable consulted as the last fallback for the active workspace.
pub const ENV_WORKSPACE: &str = "BERTH_WORKSPACE";

/// A resolved target: either a name (from an explicit argument, flag, or
/// environment override) or the persisted active id. Callers look entities
/// up by whichever key they got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRef {
    Name(String),
    Id(Uuid),
}

/// Out-of-band overrides for the active app and workspace.
///
/// Read once from the process environment in production; injectable so
/// tests never depend on ambient environment state.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub app: Option<String>,
    pub workspace: Option<String>,
}

impl EnvOverrides {
    /// Load overrides from the process environment.
    pub fn from_env() -> Self {
        Self {
            app: std::env::var(ENV_APP).ok().filter(|s| !s.is_empty()),
            workspace: std::env::var(ENV_WORKSPACE).ok().filter(|s| !s.is_empty()),
        }
    }

    /// No overrides (for tests and non-interactive callers).
    pub fn disabled() -> Self {
        Self::default()
    }

    fn for_level(&self, level: ContextLevel) -> Option<&str> {
        match level {
            ContextLevel::App => self.app.as_deref(),
            ContextLevel::Workspace => self.workspace.as_deref(),
            _ => None,
        }
    }
}

/// Owns active-context reads, writes, and cascade clears.
///
/// The persisted form is a singleton row in the store; in-process the
/// context is always an explicitly loaded [`crate::models::ActiveContext`]
/// snapshot, never ambient global state.
pub struct Resolver {
    db: Database,
    env: EnvOverrides,
}

impl Resolver {
    pub fn new(db: Database, env: EnvOverrides) -> Self {
        Self { db, env }
    }

    /// Resolve the target at `level` from, in order: `explicit` (positional
    /// argument), `flag`, the persisted active context, the environment
    /// override. Empty strings count as absent. The precedence order is
    /// fixed.
    pub fn resolve(&self, level: ContextLevel, explicit: &str, flag: &str) -> Result<TargetRef> {
        if !explicit.is_empty() {
            return Ok(TargetRef::Name(explicit.to_string()));
        }
        if !flag.is_empty() {
            return Ok(TargetRef::Name(flag.to_string()));
        }
        if let Some(id) = self.db.get_context()?.get(level) {
            return Ok(TargetRef::Id(id));
        }
        if let Some(name) = self.env.for_level(level) {
            tracing::debug!(level = %level, name, "resolved target from environment override");
            return Ok(TargetRef::Name(name.to_string()));
        }
        Err(Error::NoActiveContext { level })
    }

    /// Persist `id` as active for `level` and clear every level strictly
    /// below it. Ancestors and siblings are untouched. Existence of `id` is
    /// the caller's responsibility; the resolver does not re-validate.
    pub fn set_active(&self, level: ContextLevel, id: Uuid) -> Result<()> {
        self.db.set_active(level, Some(id))?;
        for below in level.descendants() {
            self.db.set_active(*below, None)?;
        }
        tracing::debug!(level = %level, %id, "set active context");
        Ok(())
    }

    /// Null `level` and everything beneath it. Clearing an already-null
    /// level is a no-op, not an error.
    pub fn clear_active(&self, level: ContextLevel) -> Result<()> {
        self.db.set_active(level, None)?;
        for below in level.descendants() {
            self.db.set_active(*below, None)?;
        }
        tracing::debug!(level = %level, "cleared active context");
        Ok(())
    }

    /// Clear every level.
    pub fn clear_all(&self) -> Result<()> {
        self.clear_active(ContextLevel::Ecosystem)
    }

    /// Look up the active ecosystem.
    pub fn ecosystem(&self) -> Result<Ecosystem> {
        match self.resolve(ContextLevel::Ecosystem, "", "")? {
            TargetRef::Id(id) => self
                .db
                .get_ecosystem(id)?
                .ok_or_else(|| Error::not_found("ecosystem", id.to_string())),
            TargetRef::Name(name) => self
                .db
                .get_ecosystem_by_name(&name)?
                .ok_or_else(|| Error::not_found("ecosystem", name)),
        }
    }

    /// Look up the active domain, scoping a by-name lookup under the
    /// active ecosystem.
    pub fn domain(&self) -> Result<Domain> {
        match self.resolve(ContextLevel::Domain, "", "")? {
            TargetRef::Id(id) => self
                .db
                .get_domain(id)?
                .ok_or_else(|| Error::not_found("domain", id.to_string())),
            TargetRef::Name(name) => {
                let ecosystem = self.ecosystem()?;
                self.db
                    .get_domain_by_name(ecosystem.id, &name)?
                    .ok_or_else(|| Error::not_found("domain", name))
            }
        }
    }

    /// Look up the active app, with `flag` taking precedence over the
    /// persisted context. A by-name lookup is scoped under the active
    /// domain; without one it falls back to a global name search.
    pub fn app(&self, flag: Option<&str>) -> Result<App> {
        match self.resolve(ContextLevel::App, "", flag.unwrap_or(""))? {
            TargetRef::Id(id) => self
                .db
                .get_app(id)?
                .ok_or_else(|| Error::not_found("app", id.to_string())),
            TargetRef::Name(name) => match self.domain() {
                Ok(domain) => self
                    .db
                    .get_app_by_name(domain.id, &name)?
                    .ok_or_else(|| Error::not_found("app", name)),
                Err(Error::NoActiveContext { .. }) => self
                    .db
                    .find_app_by_name(&name)?
                    .ok_or_else(|| Error::not_found("app", name)),
                Err(e) => Err(e),
            },
        }
    }

    /// Look up the active workspace together with its owning app.
    ///
    /// An `app_flag` pins the owning app first and the workspace is then
    /// looked up within that app only, so a persisted workspace id under a
    /// different app can never be returned. Without a flag the persisted
    /// id wins and the owner is derived from the workspace row.
    pub fn workspace(
        &self,
        explicit: Option<&str>,
        app_flag: Option<&str>,
    ) -> Result<(App, Workspace)> {
        if app_flag.is_some() {
            let app = self.app(app_flag)?;
            let name = match explicit {
                Some(name) => name.to_string(),
                None => match self.resolve(ContextLevel::Workspace, "", "")? {
                    TargetRef::Id(id) => {
                        self.db
                            .get_workspace(id)?
                            .ok_or_else(|| Error::not_found("workspace", id.to_string()))?
                            .name
                    }
                    TargetRef::Name(name) => name,
                },
            };
            let workspace = self
                .db
                .get_workspace_by_name(app.id, &name)?
                .ok_or_else(|| Error::not_found("workspace", name))?;
            return Ok((app, workspace));
        }
        match self.resolve(ContextLevel::Workspace, explicit.unwrap_or(""), "")? {
            TargetRef::Id(id) => {
                let workspace = self
                    .db
                    .get_workspace(id)?
                    .ok_or_else(|| Error::not_found("workspace", id.to_string()))?;
                let app = self
                    .db
                    .get_app(workspace.app_id)?
                    .ok_or_else(|| Error::not_found("app", workspace.app_id.to_string()))?;
                Ok((app, workspace))
            }
            TargetRef::Name(name) => {
                let app = self.app(None)?;
                let workspace = self
                    .db
                    .get_workspace_by_name(app.id, &name)?
                    .ok_or_else(|| Error::not_found("workspace", name))?;
                Ok((app, workspace))
            }
        }
    }
}
