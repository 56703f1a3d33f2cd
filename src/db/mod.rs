mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;

/// The persistent store behind every berth command.
///
/// Thin typed CRUD over a single SQLite file. Atomicity is whatever a single
/// statement through the mutex-guarded connection gives us; two racing tool
/// invocations on the same database are an accepted limitation.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path.parent().ok_or_else(|| {
            Error::Io(std::io::Error::other("database path has no parent directory"))
        })?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "berth").ok_or_else(|| {
            Error::Io(std::io::Error::other("could not determine data directory"))
        })?;
        let db_path = dirs.data_dir().join("berth.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Ecosystem operations
    // ============================================================

    pub fn get_all_ecosystems(&self) -> Result<Vec<Ecosystem>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, description, created_at FROM ecosystems ORDER BY name",
        )?;
        let ecosystems = stmt
            .query_map([], row_to_ecosystem)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ecosystems)
    }

    pub fn get_ecosystem(&self, id: Uuid) -> Result<Option<Ecosystem>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, description, created_at FROM ecosystems WHERE id = ?",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_ecosystem(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_ecosystem_by_name(&self, name: &str) -> Result<Option<Ecosystem>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, description, created_at FROM ecosystems WHERE name = ?",
        )?;
        let mut rows = stmt.query([name])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_ecosystem(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_ecosystem(&self, input: CreateEcosystemInput) -> Result<Ecosystem> {
        if self.get_ecosystem_by_name(&input.name)?.is_some() {
            return Err(Error::already_exists("ecosystem", &input.name));
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO ecosystems (id, name, description, created_at) VALUES (?, ?, ?, ?)",
            (
                id.to_string(),
                &input.name,
                &input.description,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Ecosystem {
            id,
            name: input.name,
            description: input.description,
            created_at: now,
        })
    }

    pub fn update_ecosystem(
        &self,
        id: Uuid,
        input: UpdateEcosystemInput,
    ) -> Result<Option<Ecosystem>> {
        let Some(existing) = self.get_ecosystem(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);

        conn.execute(
            "UPDATE ecosystems SET name = ?, description = ? WHERE id = ?",
            (&name, &description, id.to_string()),
        )?;

        Ok(Some(Ecosystem {
            id,
            name,
            description,
            created_at: existing.created_at,
        }))
    }

    pub fn delete_ecosystem(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM ecosystems WHERE id = ?", [id.to_string()])?;
        prune_context(&conn)?;
        Ok(rows > 0)
    }

    // ============================================================
    // Domain operations
    // ============================================================

    pub fn get_domains_by_ecosystem(&self, ecosystem_id: Uuid) -> Result<Vec<Domain>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, ecosystem_id, name, description, created_at
             FROM domains WHERE ecosystem_id = ? ORDER BY name",
        )?;
        let domains = stmt
            .query_map([ecosystem_id.to_string()], row_to_domain)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(domains)
    }

    pub fn get_domain(&self, id: Uuid) -> Result<Option<Domain>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, ecosystem_id, name, description, created_at FROM domains WHERE id = ?",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_domain(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_domain_by_name(&self, ecosystem_id: Uuid, name: &str) -> Result<Option<Domain>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, ecosystem_id, name, description, created_at
             FROM domains WHERE ecosystem_id = ? AND name = ?",
        )?;
        let mut rows = stmt.query((ecosystem_id.to_string(), name))?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_domain(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_domain(&self, ecosystem_id: Uuid, input: CreateDomainInput) -> Result<Domain> {
        self.get_ecosystem(ecosystem_id)?
            .ok_or_else(|| Error::not_found("ecosystem", ecosystem_id.to_string()))?;
        if self.get_domain_by_name(ecosystem_id, &input.name)?.is_some() {
            return Err(Error::already_exists("domain", &input.name));
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO domains (id, ecosystem_id, name, description, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                ecosystem_id.to_string(),
                &input.name,
                &input.description,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Domain {
            id,
            ecosystem_id,
            name: input.name,
            description: input.description,
            created_at: now,
        })
    }

    pub fn update_domain(&self, id: Uuid, input: UpdateDomainInput) -> Result<Option<Domain>> {
        let Some(existing) = self.get_domain(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);

        conn.execute(
            "UPDATE domains SET name = ?, description = ? WHERE id = ?",
            (&name, &description, id.to_string()),
        )?;

        Ok(Some(Domain {
            id,
            ecosystem_id: existing.ecosystem_id,
            name,
            description,
            created_at: existing.created_at,
        }))
    }

    pub fn delete_domain(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM domains WHERE id = ?", [id.to_string()])?;
        prune_context(&conn)?;
        Ok(rows > 0)
    }

    // ============================================================
    // App operations
    // ============================================================

    pub fn get_apps_by_domain(&self, domain_id: Uuid) -> Result<Vec<App>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, domain_id, name, description, created_at
             FROM apps WHERE domain_id = ? ORDER BY name",
        )?;
        let apps = stmt
            .query_map([domain_id.to_string()], row_to_app)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(apps)
    }

    pub fn get_app(&self, id: Uuid) -> Result<Option<App>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, domain_id, name, description, created_at FROM apps WHERE id = ?",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_app(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_app_by_name(&self, domain_id: Uuid, name: &str) -> Result<Option<App>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, domain_id, name, description, created_at
             FROM apps WHERE domain_id = ? AND name = ?",
        )?;
        let mut rows = stmt.query((domain_id.to_string(), name))?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_app(row)?)),
            None => Ok(None),
        }
    }

    /// Find an app by name across all domains.
    ///
    /// Used when an app name arrives without domain scope (the environment
    /// override). First match by name ordering wins when names collide across
    /// domains.
    pub fn find_app_by_name(&self, name: &str) -> Result<Option<App>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, domain_id, name, description, created_at
             FROM apps WHERE name = ? ORDER BY name LIMIT 1",
        )?;
        let mut rows = stmt.query([name])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_app(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_app(&self, domain_id: Uuid, input: CreateAppInput) -> Result<App> {
        self.get_domain(domain_id)?
            .ok_or_else(|| Error::not_found("domain", domain_id.to_string()))?;
        if self.get_app_by_name(domain_id, &input.name)?.is_some() {
            return Err(Error::already_exists("app", &input.name));
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO apps (id, domain_id, name, description, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                domain_id.to_string(),
                &input.name,
                &input.description,
                now.to_rfc3339(),
            ),
        )?;

        Ok(App {
            id,
            domain_id,
            name: input.name,
            description: input.description,
            created_at: now,
        })
    }

    pub fn update_app(&self, id: Uuid, input: UpdateAppInput) -> Result<Option<App>> {
        let Some(existing) = self.get_app(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);

        conn.execute(
            "UPDATE apps SET name = ?, description = ? WHERE id = ?",
            (&name, &description, id.to_string()),
        )?;

        Ok(Some(App {
            id,
            domain_id: existing.domain_id,
            name,
            description,
            created_at: existing.created_at,
        }))
    }

    pub fn delete_app(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM apps WHERE id = ?", [id.to_string()])?;
        prune_context(&conn)?;
        Ok(rows > 0)
    }

    // ============================================================
    // Workspace operations
    // ============================================================

    pub fn get_workspaces_by_app(&self, app_id: Uuid) -> Result<Vec<Workspace>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, app_id, name, description, image, status, plugins, nvim_structure, created_at
             FROM workspaces WHERE app_id = ? ORDER BY name",
        )?;
        let workspaces = stmt
            .query_map([app_id.to_string()], row_to_workspace)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(workspaces)
    }

    pub fn get_workspace(&self, id: Uuid) -> Result<Option<Workspace>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, app_id, name, description, image, status, plugins, nvim_structure, created_at
             FROM workspaces WHERE id = ?",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_workspace(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_workspace_by_name(&self, app_id: Uuid, name: &str) -> Result<Option<Workspace>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, app_id, name, description, image, status, plugins, nvim_structure, created_at
             FROM workspaces WHERE app_id = ? AND name = ?",
        )?;
        let mut rows = stmt.query((app_id.to_string(), name))?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_workspace(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_workspace(&self, app_id: Uuid, input: CreateWorkspaceInput) -> Result<Workspace> {
        self.get_app(app_id)?
            .ok_or_else(|| Error::not_found("app", app_id.to_string()))?;
        if self.get_workspace_by_name(app_id, &input.name)?.is_some() {
            return Err(Error::already_exists("workspace", &input.name));
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO workspaces (id, app_id, name, description, image, status, plugins, nvim_structure, created_at)
             VALUES (?, ?, ?, ?, ?, 'unknown', NULL, NULL, ?)",
            (
                id.to_string(),
                app_id.to_string(),
                &input.name,
                &input.description,
                &input.image,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Workspace {
            id,
            app_id,
            name: input.name,
            description: input.description,
            image: input.image,
            status: "unknown".to_string(),
            plugins: None,
            nvim_structure: None,
            created_at: now,
        })
    }

    pub fn update_workspace(
        &self,
        id: Uuid,
        input: UpdateWorkspaceInput,
    ) -> Result<Option<Workspace>> {
        let Some(existing) = self.get_workspace(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);
        let image = input.image.unwrap_or(existing.image);
        let status = input.status.unwrap_or(existing.status);

        conn.execute(
            "UPDATE workspaces SET name = ?, description = ?, image = ?, status = ? WHERE id = ?",
            (&name, &description, &image, &status, id.to_string()),
        )?;

        Ok(Some(Workspace {
            id,
            app_id: existing.app_id,
            name,
            description,
            image,
            status,
            plugins: existing.plugins,
            nvim_structure: existing.nvim_structure,
            created_at: existing.created_at,
        }))
    }

    /// Persist a workspace's plugin set and generation marker.
    ///
    /// The plugin set manager mutates a `Workspace` value in memory; callers
    /// write it back through here. `None` and `Some("")` round-trip as-is.
    pub fn save_workspace_plugins(&self, ws: &Workspace) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "UPDATE workspaces SET plugins = ?, nvim_structure = ? WHERE id = ?",
            (
                &ws.plugins,
                ws.nvim_structure.map(|s| s.as_str()),
                ws.id.to_string(),
            ),
        )?;
        Ok(())
    }

    pub fn delete_workspace(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM workspaces WHERE id = ?", [id.to_string()])?;
        prune_context(&conn)?;
        Ok(rows > 0)
    }

    // ============================================================
    // Catalog operations (nvim plugins, themes, terminal packages)
    // ============================================================

    pub fn get_catalog_entries(&self, catalog: Catalog) -> Result<Vec<CatalogEntry>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT id, name, url, description, created_at FROM {} ORDER BY name",
            catalog_table(catalog)
        ))?;
        let entries = stmt
            .query_map([], row_to_catalog_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn get_catalog_entry_by_name(
        &self,
        catalog: Catalog,
        name: &str,
    ) -> Result<Option<CatalogEntry>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT id, name, url, description, created_at FROM {} WHERE name = ?",
            catalog_table(catalog)
        ))?;
        let mut rows = stmt.query([name])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_catalog_entry(row)?)),
            None => Ok(None),
        }
    }

    pub fn create_catalog_entry(
        &self,
        catalog: Catalog,
        input: CreateCatalogEntryInput,
    ) -> Result<CatalogEntry> {
        if self.get_catalog_entry_by_name(catalog, &input.name)?.is_some() {
            return Err(Error::already_exists(catalog.noun(), &input.name));
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            &format!(
                "INSERT INTO {} (id, name, url, description, created_at) VALUES (?, ?, ?, ?, ?)",
                catalog_table(catalog)
            ),
            (
                id.to_string(),
                &input.name,
                &input.url,
                &input.description,
                now.to_rfc3339(),
            ),
        )?;

        Ok(CatalogEntry {
            id,
            name: input.name,
            url: input.url,
            description: input.description,
            created_at: now,
        })
    }

    pub fn delete_catalog_entry(&self, catalog: Catalog, name: &str) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            &format!("DELETE FROM {} WHERE name = ?", catalog_table(catalog)),
            [name],
        )?;
        Ok(rows > 0)
    }

    /// All names in one catalog, ordered. The global plugin library for the
    /// plugin set manager is `catalog_names(Catalog::NvimPlugin)`.
    pub fn catalog_names(&self, catalog: Catalog) -> Result<Vec<String>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT name FROM {} ORDER BY name",
            catalog_table(catalog)
        ))?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    // ============================================================
    // Active context (singleton row)
    // ============================================================

    pub fn get_context(&self) -> Result<ActiveContext> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT ecosystem_id, domain_id, app_id, workspace_id FROM active_context WHERE id = 1",
        )?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => Ok(ActiveContext {
                ecosystem_id: row.get::<_, Option<String>>(0)?.map(parse_uuid),
                domain_id: row.get::<_, Option<String>>(1)?.map(parse_uuid),
                app_id: row.get::<_, Option<String>>(2)?.map(parse_uuid),
                workspace_id: row.get::<_, Option<String>>(3)?.map(parse_uuid),
            }),
            None => Ok(ActiveContext::default()),
        }
    }

    /// Write one level of the context singleton. Cascade invariants live in
    /// the resolver, not here.
    pub fn set_active(&self, level: ContextLevel, id: Option<Uuid>) -> Result<()> {
        let column = match level {
            ContextLevel::Ecosystem => "ecosystem_id",
            ContextLevel::Domain => "domain_id",
            ContextLevel::App => "app_id",
            ContextLevel::Workspace => "workspace_id",
        };
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            &format!("UPDATE active_context SET {} = ? WHERE id = 1", column),
            [id.map(|u| u.to_string())],
        )?;
        Ok(())
    }

    // ============================================================
    // Defaults (generic key-value map)
    // ============================================================

    pub fn get_default(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT value FROM defaults WHERE key = ?")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn set_default(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT INTO defaults (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;
        Ok(())
    }

    pub fn delete_default(&self, key: &str) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM defaults WHERE key = ?", [key])?;
        Ok(rows > 0)
    }

    pub fn list_defaults(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT key, value FROM defaults ORDER BY key")?;
        let defaults = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(defaults)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// Null every active-context level whose referenced row no longer exists.
/// Hierarchy deletes cascade through foreign keys, so a single delete can
/// orphan several levels at once; pruning each column independently keeps
/// the context consistent with whatever survived.
fn prune_context(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "UPDATE active_context SET ecosystem_id = NULL
           WHERE ecosystem_id IS NOT NULL AND ecosystem_id NOT IN (SELECT id FROM ecosystems);
         UPDATE active_context SET domain_id = NULL
           WHERE domain_id IS NOT NULL AND domain_id NOT IN (SELECT id FROM domains);
         UPDATE active_context SET app_id = NULL
           WHERE app_id IS NOT NULL AND app_id NOT IN (SELECT id FROM apps);
         UPDATE active_context SET workspace_id = NULL
           WHERE workspace_id IS NOT NULL AND workspace_id NOT IN (SELECT id FROM workspaces);",
    )
}

fn catalog_table(catalog: Catalog) -> &'static str {
    match catalog {
        Catalog::NvimPlugin => "nvim_plugins",
        Catalog::Theme => "themes",
        Catalog::TerminalPackage => "terminal_packages",
    }
}

fn row_to_ecosystem(row: &Row<'_>) -> rusqlite::Result<Ecosystem> {
    Ok(Ecosystem {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

fn row_to_domain(row: &Row<'_>) -> rusqlite::Result<Domain> {
    Ok(Domain {
        id: parse_uuid(row.get::<_, String>(0)?),
        ecosystem_id: parse_uuid(row.get::<_, String>(1)?),
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn row_to_app(row: &Row<'_>) -> rusqlite::Result<App> {
    Ok(App {
        id: parse_uuid(row.get::<_, String>(0)?),
        domain_id: parse_uuid(row.get::<_, String>(1)?),
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn row_to_workspace(row: &Row<'_>) -> rusqlite::Result<Workspace> {
    Ok(Workspace {
        id: parse_uuid(row.get::<_, String>(0)?),
        app_id: parse_uuid(row.get::<_, String>(1)?),
        name: row.get(2)?,
        description: row.get(3)?,
        image: row.get(4)?,
        status: row.get(5)?,
        plugins: row.get(6)?,
        nvim_structure: row
            .get::<_, Option<String>>(7)?
            .and_then(|s| NvimStructure::from_str(&s)),
        created_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

fn row_to_catalog_entry(row: &Row<'_>) -> rusqlite::Result<CatalogEntry> {
    Ok(CatalogEntry {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        url: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
