//! The standard handlers.
//!
//! Hierarchy handlers scope their queries to the resolved ancestors in the
//! [`ResourceScope`]; a missing ancestor surfaces as `NoActiveContext` for
//! that level. Catalog handlers are global and ignore the scope entirely.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    Catalog, CatalogEntry, ContextLevel, CreateAppInput, CreateCatalogEntryInput,
    CreateEcosystemInput, CreateWorkspaceInput,
};

use super::{CreateSpec, Kind, Resource, ResourceContext, ResourceHandler};

/// Image used for new workspaces when neither the create spec nor the
/// `image` default supplies one.
pub const FALLBACK_IMAGE: &str = "ubuntu:24.04";

pub struct EcosystemHandler;

impl ResourceHandler for EcosystemHandler {
    fn kind(&self) -> Kind {
        Kind::Ecosystem
    }

    fn get(&self, ctx: &ResourceContext, name: &str) -> Result<Resource> {
        ctx.db
            .get_ecosystem_by_name(name)?
            .map(Resource::Ecosystem)
            .ok_or_else(|| Error::not_found("ecosystem", name))
    }

    fn list(&self, ctx: &ResourceContext) -> Result<Vec<Resource>> {
        Ok(ctx
            .db
            .get_all_ecosystems()?
            .into_iter()
            .map(Resource::Ecosystem)
            .collect())
    }

    fn delete(&self, ctx: &ResourceContext, name: &str) -> Result<()> {
        let ecosystem = ctx
            .db
            .get_ecosystem_by_name(name)?
            .ok_or_else(|| Error::not_found("ecosystem", name))?;
        ctx.db.delete_ecosystem(ecosystem.id)?;
        Ok(())
    }

    fn create(&self, ctx: &ResourceContext, spec: &CreateSpec) -> Result<Resource> {
        let ecosystem = ctx.db.create_ecosystem(CreateEcosystemInput {
            name: spec.name.clone(),
            description: spec.description.clone(),
        })?;
        Ok(Resource::Ecosystem(ecosystem))
    }
}

/// Domains dispatch get/list/delete through the registry; creation stays on
/// the `use`-oriented hierarchy surface of the CLI, so the default
/// `NotSupported` create body applies.
pub struct DomainHandler;

impl DomainHandler {
    fn ecosystem_scope(ctx: &ResourceContext) -> Result<Uuid> {
        ctx.scope.ecosystem_id.ok_or(Error::NoActiveContext {
            level: ContextLevel::Ecosystem,
        })
    }
}

impl ResourceHandler for DomainHandler {
    fn kind(&self) -> Kind {
        Kind::Domain
    }

    fn get(&self, ctx: &ResourceContext, name: &str) -> Result<Resource> {
        let ecosystem_id = Self::ecosystem_scope(ctx)?;
        ctx.db
            .get_domain_by_name(ecosystem_id, name)?
            .map(Resource::Domain)
            .ok_or_else(|| Error::not_found("domain", name))
    }

    fn list(&self, ctx: &ResourceContext) -> Result<Vec<Resource>> {
        let ecosystem_id = Self::ecosystem_scope(ctx)?;
        Ok(ctx
            .db
            .get_domains_by_ecosystem(ecosystem_id)?
            .into_iter()
            .map(Resource::Domain)
            .collect())
    }

    fn delete(&self, ctx: &ResourceContext, name: &str) -> Result<()> {
        let ecosystem_id = Self::ecosystem_scope(ctx)?;
        let domain = ctx
            .db
            .get_domain_by_name(ecosystem_id, name)?
            .ok_or_else(|| Error::not_found("domain", name))?;
        ctx.db.delete_domain(domain.id)?;
        Ok(())
    }
}

pub struct AppHandler;

impl AppHandler {
    fn domain_scope(ctx: &ResourceContext) -> Result<Uuid> {
        ctx.scope.domain_id.ok_or(Error::NoActiveContext {
            level: ContextLevel::Domain,
        })
    }
}

impl ResourceHandler for AppHandler {
    fn kind(&self) -> Kind {
        Kind::App
    }

    fn get(&self, ctx: &ResourceContext, name: &str) -> Result<Resource> {
        let domain_id = Self::domain_scope(ctx)?;
        ctx.db
            .get_app_by_name(domain_id, name)?
            .map(Resource::App)
            .ok_or_else(|| Error::not_found("app", name))
    }

    fn list(&self, ctx: &ResourceContext) -> Result<Vec<Resource>> {
        let domain_id = Self::domain_scope(ctx)?;
        Ok(ctx
            .db
            .get_apps_by_domain(domain_id)?
            .into_iter()
            .map(Resource::App)
            .collect())
    }

    fn delete(&self, ctx: &ResourceContext, name: &str) -> Result<()> {
        let domain_id = Self::domain_scope(ctx)?;
        let app = ctx
            .db
            .get_app_by_name(domain_id, name)?
            .ok_or_else(|| Error::not_found("app", name))?;
        ctx.db.delete_app(app.id)?;
        Ok(())
    }

    fn create(&self, ctx: &ResourceContext, spec: &CreateSpec) -> Result<Resource> {
        let domain_id = Self::domain_scope(ctx)?;
        let app = ctx.db.create_app(
            domain_id,
            CreateAppInput {
                name: spec.name.clone(),
                description: spec.description.clone(),
            },
        )?;
        Ok(Resource::App(app))
    }
}

pub struct WorkspaceHandler;

impl WorkspaceHandler {
    fn app_scope(ctx: &ResourceContext) -> Result<Uuid> {
        ctx.scope.app_id.ok_or(Error::NoActiveContext {
            level: ContextLevel::App,
        })
    }
}

impl ResourceHandler for WorkspaceHandler {
    fn kind(&self) -> Kind {
        Kind::Workspace
    }

    fn get(&self, ctx: &ResourceContext, name: &str) -> Result<Resource> {
        let app_id = Self::app_scope(ctx)?;
        ctx.db
            .get_workspace_by_name(app_id, name)?
            .map(Resource::Workspace)
            .ok_or_else(|| Error::not_found("workspace", name))
    }

    fn list(&self, ctx: &ResourceContext) -> Result<Vec<Resource>> {
        let app_id = Self::app_scope(ctx)?;
        Ok(ctx
            .db
            .get_workspaces_by_app(app_id)?
            .into_iter()
            .map(Resource::Workspace)
            .collect())
    }

    fn delete(&self, ctx: &ResourceContext, name: &str) -> Result<()> {
        let app_id = Self::app_scope(ctx)?;
        let workspace = ctx
            .db
            .get_workspace_by_name(app_id, name)?
            .ok_or_else(|| Error::not_found("workspace", name))?;
        ctx.db.delete_workspace(workspace.id)?;
        Ok(())
    }

    fn create(&self, ctx: &ResourceContext, spec: &CreateSpec) -> Result<Resource> {
        let app_id = Self::app_scope(ctx)?;
        let image = match &spec.image {
            Some(image) => image.clone(),
            None => ctx
                .db
                .get_default("image")?
                .unwrap_or_else(|| FALLBACK_IMAGE.to_string()),
        };
        let workspace = ctx.db.create_workspace(
            app_id,
            CreateWorkspaceInput {
                name: spec.name.clone(),
                description: spec.description.clone(),
                image,
            },
        )?;
        Ok(Resource::Workspace(workspace))
    }
}

/// One handler covers all three global catalogs; the [`Catalog`] tag picks
/// the table and the [`Kind`] picks the resource variant.
pub struct CatalogHandler {
    kind: Kind,
    catalog: Catalog,
}

impl CatalogHandler {
    pub fn nvim_plugins() -> Self {
        Self {
            kind: Kind::NvimPlugin,
            catalog: Catalog::NvimPlugin,
        }
    }

    pub fn themes() -> Self {
        Self {
            kind: Kind::Theme,
            catalog: Catalog::Theme,
        }
    }

    pub fn terminal_packages() -> Self {
        Self {
            kind: Kind::TerminalPackage,
            catalog: Catalog::TerminalPackage,
        }
    }

    fn wrap(&self, entry: CatalogEntry) -> Resource {
        match self.kind {
            Kind::Theme => Resource::Theme(entry),
            Kind::TerminalPackage => Resource::TerminalPackage(entry),
            _ => Resource::NvimPlugin(entry),
        }
    }
}

impl ResourceHandler for CatalogHandler {
    fn kind(&self) -> Kind {
        self.kind
    }

    fn get(&self, ctx: &ResourceContext, name: &str) -> Result<Resource> {
        ctx.db
            .get_catalog_entry_by_name(self.catalog, name)?
            .map(|e| self.wrap(e))
            .ok_or_else(|| Error::not_found(self.catalog.noun(), name))
    }

    fn list(&self, ctx: &ResourceContext) -> Result<Vec<Resource>> {
        Ok(ctx
            .db
            .get_catalog_entries(self.catalog)?
            .into_iter()
            .map(|e| self.wrap(e))
            .collect())
    }

    fn delete(&self, ctx: &ResourceContext, name: &str) -> Result<()> {
        if !ctx.db.delete_catalog_entry(self.catalog, name)? {
            return Err(Error::not_found(self.catalog.noun(), name));
        }
        Ok(())
    }

    fn create(&self, ctx: &ResourceContext, spec: &CreateSpec) -> Result<Resource> {
        let entry = ctx.db.create_catalog_entry(
            self.catalog,
            CreateCatalogEntryInput {
                name: spec.name.clone(),
                url: spec.url.clone(),
                description: spec.description.clone(),
            },
        )?;
        Ok(self.wrap(entry))
    }
}
