//! Polymorphic resource dispatch.
//!
//! Every `get/list/delete/create <kind>` command shares one contract: a
//! [`Kind`] tag selects a [`ResourceHandler`] out of the [`Registry`], and
//! the handler returns [`Resource`] values regardless of how the underlying
//! entity is stored or scoped. Hierarchy kinds resolve against the active
//! context carried in [`ResourceScope`]; catalog kinds are global and
//! unscoped. Adding a resource kind means adding a handler and registering
//! it in [`Registry::standard`] — no command plumbing changes.

mod handlers;

use std::collections::BTreeMap;
use std::str::FromStr;

use uuid::Uuid;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{ActiveContext, App, CatalogEntry, Domain, Ecosystem, Workspace};
use crate::output::OutputFormat;

pub use handlers::*;

/// Identifies a resource type for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Kind {
    Ecosystem,
    Domain,
    App,
    Workspace,
    NvimPlugin,
    Theme,
    TerminalPackage,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ecosystem => "ecosystem",
            Self::Domain => "domain",
            Self::App => "app",
            Self::Workspace => "workspace",
            Self::NvimPlugin => "nvim-plugin",
            Self::Theme => "theme",
            Self::TerminalPackage => "terminal-package",
        }
    }
}

impl FromStr for Kind {
    type Err = Error;

    /// Accepts the CLI aliases and plural forms users actually type.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "eco" | "ecosystem" | "ecosystems" => Ok(Self::Ecosystem),
            "domain" | "domains" => Ok(Self::Domain),
            "app" | "apps" => Ok(Self::App),
            "ws" | "workspace" | "workspaces" => Ok(Self::Workspace),
            "plugin" | "plugins" | "nvim-plugin" | "nvim-plugins" | "nvimplugin" => {
                Ok(Self::NvimPlugin)
            }
            "theme" | "themes" => Ok(Self::Theme),
            "term" | "terminal-package" | "terminal-packages" => Ok(Self::TerminalPackage),
            other => Err(Error::UnsupportedKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability-tagged wrapper over one entity of any kind.
///
/// Kind-specific access goes through the safe `as_*` accessors, which fail
/// with `UnsupportedKind` on mismatch instead of an unchecked downcast.
/// Kind-agnostic projection goes through [`Resource::to_json`] /
/// [`Resource::to_yaml`].
#[derive(Debug, Clone)]
pub enum Resource {
    Ecosystem(Ecosystem),
    Domain(Domain),
    App(App),
    Workspace(Workspace),
    NvimPlugin(CatalogEntry),
    Theme(CatalogEntry),
    TerminalPackage(CatalogEntry),
}

impl Resource {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Ecosystem(_) => Kind::Ecosystem,
            Self::Domain(_) => Kind::Domain,
            Self::App(_) => Kind::App,
            Self::Workspace(_) => Kind::Workspace,
            Self::NvimPlugin(_) => Kind::NvimPlugin,
            Self::Theme(_) => Kind::Theme,
            Self::TerminalPackage(_) => Kind::TerminalPackage,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Ecosystem(e) => &e.name,
            Self::Domain(d) => &d.name,
            Self::App(a) => &a.name,
            Self::Workspace(w) => &w.name,
            Self::NvimPlugin(c) | Self::Theme(c) | Self::TerminalPackage(c) => &c.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Ecosystem(e) => e.description.as_deref(),
            Self::Domain(d) => d.description.as_deref(),
            Self::App(a) => a.description.as_deref(),
            Self::Workspace(w) => w.description.as_deref(),
            Self::NvimPlugin(c) | Self::Theme(c) | Self::TerminalPackage(c) => {
                c.description.as_deref()
            }
        }
    }

    pub fn as_ecosystem(&self) -> Result<&Ecosystem> {
        match self {
            Self::Ecosystem(e) => Ok(e),
            other => Err(Error::UnsupportedKind(other.kind().as_str().to_string())),
        }
    }

    pub fn as_domain(&self) -> Result<&Domain> {
        match self {
            Self::Domain(d) => Ok(d),
            other => Err(Error::UnsupportedKind(other.kind().as_str().to_string())),
        }
    }

    pub fn as_app(&self) -> Result<&App> {
        match self {
            Self::App(a) => Ok(a),
            other => Err(Error::UnsupportedKind(other.kind().as_str().to_string())),
        }
    }

    pub fn as_workspace(&self) -> Result<&Workspace> {
        match self {
            Self::Workspace(w) => Ok(w),
            other => Err(Error::UnsupportedKind(other.kind().as_str().to_string())),
        }
    }

    pub fn as_catalog_entry(&self) -> Result<&CatalogEntry> {
        match self {
            Self::NvimPlugin(c) | Self::Theme(c) | Self::TerminalPackage(c) => Ok(c),
            other => Err(Error::UnsupportedKind(other.kind().as_str().to_string())),
        }
    }

    /// Kind-agnostic projection: the entity's fields plus a `kind` tag.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        let mut value = match self {
            Self::Ecosystem(e) => serde_json::to_value(e)?,
            Self::Domain(d) => serde_json::to_value(d)?,
            Self::App(a) => serde_json::to_value(a)?,
            Self::Workspace(w) => serde_json::to_value(w)?,
            Self::NvimPlugin(c) | Self::Theme(c) | Self::TerminalPackage(c) => {
                serde_json::to_value(c)?
            }
        };
        if let Some(map) = value.as_object_mut() {
            map.insert(
                "kind".to_string(),
                serde_json::Value::String(self.kind().as_str().to_string()),
            );
        }
        Ok(value)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_value()?)?)
    }
}

/// The resolved active hierarchy ids a handler may scope its queries to.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceScope {
    pub ecosystem_id: Option<Uuid>,
    pub domain_id: Option<Uuid>,
    pub app_id: Option<Uuid>,
}

impl ResourceScope {
    pub fn from_context(ctx: &ActiveContext) -> Self {
        Self {
            ecosystem_id: ctx.ecosystem_id,
            domain_id: ctx.domain_id,
            app_id: ctx.app_id,
        }
    }
}

/// Everything a handler needs to serve one dispatch call.
pub struct ResourceContext {
    pub db: Database,
    pub scope: ResourceScope,
    pub format: OutputFormat,
}

/// Input for `create` dispatch. Handlers read the fields they understand
/// and ignore the rest.
#[derive(Debug, Clone, Default)]
pub struct CreateSpec {
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
}

/// The capability set bound to one [`Kind`].
///
/// `create` is optional: the default body fails with `NotSupported` rather
/// than silently no-op-ing, so a registry gap is visible as a defect.
pub trait ResourceHandler {
    fn kind(&self) -> Kind;

    fn get(&self, ctx: &ResourceContext, name: &str) -> Result<Resource>;

    fn list(&self, ctx: &ResourceContext) -> Result<Vec<Resource>>;

    fn delete(&self, ctx: &ResourceContext, name: &str) -> Result<()>;

    fn create(&self, _ctx: &ResourceContext, _spec: &CreateSpec) -> Result<Resource> {
        Err(Error::NotSupported {
            kind: self.kind().as_str().to_string(),
            operation: "create",
        })
    }
}

/// The kind-to-handler binding, built once at startup.
#[derive(Default)]
pub struct Registry {
    handlers: BTreeMap<Kind, Box<dyn ResourceHandler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full standard binding: all seven kinds.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(EcosystemHandler));
        registry.register(Box::new(DomainHandler));
        registry.register(Box::new(AppHandler));
        registry.register(Box::new(WorkspaceHandler));
        registry.register(Box::new(CatalogHandler::nvim_plugins()));
        registry.register(Box::new(CatalogHandler::themes()));
        registry.register(Box::new(CatalogHandler::terminal_packages()));
        registry
    }

    pub fn register(&mut self, handler: Box<dyn ResourceHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    fn handler(&self, kind: Kind) -> Result<&dyn ResourceHandler> {
        self.handlers
            .get(&kind)
            .map(|h| h.as_ref())
            .ok_or_else(|| Error::UnsupportedKind(kind.as_str().to_string()))
    }
}

pub fn get(registry: &Registry, ctx: &ResourceContext, kind: Kind, name: &str) -> Result<Resource> {
    registry.handler(kind)?.get(ctx, name)
}

pub fn list(registry: &Registry, ctx: &ResourceContext, kind: Kind) -> Result<Vec<Resource>> {
    registry.handler(kind)?.list(ctx)
}

pub fn delete(registry: &Registry, ctx: &ResourceContext, kind: Kind, name: &str) -> Result<()> {
    registry.handler(kind)?.delete(ctx, name)
}

pub fn create(
    registry: &Registry,
    ctx: &ResourceContext,
    kind: Kind,
    spec: &CreateSpec,
) -> Result<Resource> {
    registry.handler(kind)?.create(ctx, spec)
}
