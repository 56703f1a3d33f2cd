use berth::db::Database;
use berth::error::Error;
use berth::models::*;
use speculate2::speculate;
use uuid::Uuid;

fn create_test_ecosystem(db: &Database) -> Ecosystem {
    db.create_ecosystem(CreateEcosystemInput {
        name: "work".to_string(),
        description: None,
    })
    .expect("Failed to create ecosystem")
}

fn create_test_hierarchy(db: &Database) -> (Ecosystem, Domain, App) {
    let ecosystem = create_test_ecosystem(db);
    let domain = db
        .create_domain(
            ecosystem.id,
            CreateDomainInput {
                name: "backend".to_string(),
                description: None,
            },
        )
        .expect("Failed to create domain");
    let app = db
        .create_app(
            domain.id,
            CreateAppInput {
                name: "api".to_string(),
                description: None,
            },
        )
        .expect("Failed to create app");
    (ecosystem, domain, app)
}

fn create_test_workspace(db: &Database, app_id: Uuid, name: &str) -> Workspace {
    db.create_workspace(
        app_id,
        CreateWorkspaceInput {
            name: name.to_string(),
            description: None,
            image: "ubuntu:24.04".to_string(),
        },
    )
    .expect("Failed to create workspace")
}

#[test]
fn test_open_creates_parent_directories() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("berth.db");

    let db = Database::open(path).expect("Failed to open database");
    db.migrate().expect("Failed to run migrations");

    assert!(db.get_all_ecosystems().expect("Query failed").is_empty());
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "ecosystems" {
        describe "create_ecosystem" {
            it "creates an ecosystem with required fields" {
                let ecosystem = db.create_ecosystem(CreateEcosystemInput {
                    name: "personal".to_string(),
                    description: Some("side projects".to_string()),
                }).expect("Failed to create ecosystem");

                assert_eq!(ecosystem.name, "personal");
                assert_eq!(ecosystem.description, Some("side projects".to_string()));
            }

            it "rejects a duplicate name" {
                create_test_ecosystem(&db);
                let err = db.create_ecosystem(CreateEcosystemInput {
                    name: "work".to_string(),
                    description: None,
                }).unwrap_err();

                assert!(matches!(err, Error::AlreadyExists { .. }));
            }
        }

        describe "get_ecosystem_by_name" {
            it "returns None for a non-existent name" {
                let result = db.get_ecosystem_by_name("missing").expect("Query failed");
                assert!(result.is_none());
            }

            it "returns the ecosystem by name" {
                let created = create_test_ecosystem(&db);
                let found = db.get_ecosystem_by_name("work").expect("Query failed");
                assert_eq!(found.unwrap().id, created.id);
            }
        }

        describe "get_all_ecosystems" {
            it "returns all ecosystems ordered by name" {
                db.create_ecosystem(CreateEcosystemInput {
                    name: "zeta".to_string(),
                    description: None,
                }).expect("Failed to create");
                db.create_ecosystem(CreateEcosystemInput {
                    name: "alpha".to_string(),
                    description: None,
                }).expect("Failed to create");

                let ecosystems = db.get_all_ecosystems().expect("Query failed");
                assert_eq!(ecosystems.len(), 2);
                assert_eq!(ecosystems[0].name, "alpha");
                assert_eq!(ecosystems[1].name, "zeta");
            }
        }

        describe "update_ecosystem" {
            it "merges partial input over the existing row" {
                let ecosystem = create_test_ecosystem(&db);

                let updated = db.update_ecosystem(ecosystem.id, UpdateEcosystemInput {
                    name: None,
                    description: Some("day job".to_string()),
                }).expect("Update failed").expect("Ecosystem vanished");

                assert_eq!(updated.name, "work");
                assert_eq!(updated.description, Some("day job".to_string()));
            }

            it "returns None for a non-existent id" {
                let result = db.update_ecosystem(Uuid::new_v4(), UpdateEcosystemInput {
                    name: Some("ghost".to_string()),
                    description: None,
                }).expect("Update failed");
                assert!(result.is_none());
            }
        }

        describe "delete_ecosystem" {
            it "cascades through domains, apps, and workspaces" {
                let (ecosystem, domain, app) = create_test_hierarchy(&db);
                create_test_workspace(&db, app.id, "dev");

                assert!(db.delete_ecosystem(ecosystem.id).expect("Failed to delete"));

                assert!(db.get_domain(domain.id).expect("Query failed").is_none());
                assert!(db.get_app(app.id).expect("Query failed").is_none());
                assert!(db.get_workspaces_by_app(app.id).expect("Query failed").is_empty());
            }

            it "returns false for a non-existent id" {
                assert!(!db.delete_ecosystem(Uuid::new_v4()).expect("Query failed"));
            }
        }
    }

    describe "domains" {
        it "requires an existing parent ecosystem" {
            let err = db.create_domain(Uuid::new_v4(), CreateDomainInput {
                name: "orphan".to_string(),
                description: None,
            }).unwrap_err();

            assert!(matches!(err, Error::NotFound { .. }));
        }

        it "scopes name uniqueness to the ecosystem" {
            let (ecosystem, _, _) = create_test_hierarchy(&db);
            let other = db.create_ecosystem(CreateEcosystemInput {
                name: "personal".to_string(),
                description: None,
            }).expect("Failed to create");

            // Same name under a different ecosystem is fine
            db.create_domain(other.id, CreateDomainInput {
                name: "backend".to_string(),
                description: None,
            }).expect("Failed to create domain in other ecosystem");

            // Duplicate within the same ecosystem is not
            let err = db.create_domain(ecosystem.id, CreateDomainInput {
                name: "backend".to_string(),
                description: None,
            }).unwrap_err();
            assert!(matches!(err, Error::AlreadyExists { .. }));
        }

        it "looks up by name within the ecosystem" {
            let (ecosystem, domain, _) = create_test_hierarchy(&db);
            let found = db.get_domain_by_name(ecosystem.id, "backend").expect("Query failed");
            assert_eq!(found.unwrap().id, domain.id);
        }

        it "renames without touching the description" {
            let (_, domain, _) = create_test_hierarchy(&db);

            let updated = db.update_domain(domain.id, UpdateDomainInput {
                name: Some("services".to_string()),
                description: None,
            }).expect("Update failed").expect("Domain vanished");

            assert_eq!(updated.name, "services");
            assert_eq!(updated.ecosystem_id, domain.ecosystem_id);
        }
    }

    describe "apps" {
        it "scopes name uniqueness to the domain" {
            let (_, domain, _) = create_test_hierarchy(&db);
            let err = db.create_app(domain.id, CreateAppInput {
                name: "api".to_string(),
                description: None,
            }).unwrap_err();

            assert!(matches!(err, Error::AlreadyExists { .. }));
        }

        it "finds an app by name across domains" {
            let (_, _, app) = create_test_hierarchy(&db);
            let found = db.find_app_by_name("api").expect("Query failed");
            assert_eq!(found.unwrap().id, app.id);
        }

        it "merges partial updates" {
            let (_, _, app) = create_test_hierarchy(&db);

            let updated = db.update_app(app.id, UpdateAppInput {
                name: None,
                description: Some("public API".to_string()),
            }).expect("Update failed").expect("App vanished");

            assert_eq!(updated.name, "api");
            assert_eq!(updated.description, Some("public API".to_string()));
        }
    }

    describe "workspaces" {
        it "creates with unknown status and no plugin override" {
            let (_, _, app) = create_test_hierarchy(&db);
            let ws = create_test_workspace(&db, app.id, "dev");

            assert_eq!(ws.status, "unknown");
            assert!(ws.plugins.is_none());
            assert!(ws.nvim_structure.is_none());
        }

        it "enforces name uniqueness within the app" {
            let (_, _, app) = create_test_hierarchy(&db);
            create_test_workspace(&db, app.id, "dev");

            let err = db.create_workspace(app.id, CreateWorkspaceInput {
                name: "dev".to_string(),
                description: None,
                image: "alpine:3".to_string(),
            }).unwrap_err();
            assert!(matches!(err, Error::AlreadyExists { .. }));
        }

        it "updates fields partially" {
            let (_, _, app) = create_test_hierarchy(&db);
            let ws = create_test_workspace(&db, app.id, "dev");

            let updated = db.update_workspace(ws.id, UpdateWorkspaceInput {
                name: None,
                description: Some("main dev env".to_string()),
                image: None,
                status: Some("running".to_string()),
            }).expect("Update failed").expect("Workspace vanished");

            assert_eq!(updated.description, Some("main dev env".to_string()));
            assert_eq!(updated.image, "ubuntu:24.04");
            assert_eq!(updated.status, "running");
        }

        it "round-trips the plugin set including the explicit empty set" {
            let (_, _, app) = create_test_hierarchy(&db);
            let mut ws = create_test_workspace(&db, app.id, "dev");

            ws.plugins = Some("telescope,harpoon".to_string());
            ws.nvim_structure = Some(NvimStructure::Custom);
            db.save_workspace_plugins(&ws).expect("Save failed");

            let loaded = db.get_workspace(ws.id).expect("Query failed").unwrap();
            assert_eq!(loaded.plugins, Some("telescope,harpoon".to_string()));
            assert_eq!(loaded.nvim_structure, Some(NvimStructure::Custom));

            // Some("") and None must stay distinct through storage
            ws.plugins = Some(String::new());
            db.save_workspace_plugins(&ws).expect("Save failed");
            let loaded = db.get_workspace(ws.id).expect("Query failed").unwrap();
            assert_eq!(loaded.plugins, Some(String::new()));
        }
    }

    describe "catalogs" {
        it "stores entries per catalog independently" {
            db.create_catalog_entry(Catalog::NvimPlugin, CreateCatalogEntryInput {
                name: "telescope".to_string(),
                url: Some("https://github.com/nvim-telescope/telescope.nvim".to_string()),
                description: None,
            }).expect("Failed to create plugin");
            db.create_catalog_entry(Catalog::Theme, CreateCatalogEntryInput {
                name: "gruvbox".to_string(),
                url: None,
                description: None,
            }).expect("Failed to create theme");

            assert_eq!(db.get_catalog_entries(Catalog::NvimPlugin).expect("Query failed").len(), 1);
            assert_eq!(db.get_catalog_entries(Catalog::Theme).expect("Query failed").len(), 1);
            assert!(db.get_catalog_entries(Catalog::TerminalPackage).expect("Query failed").is_empty());
        }

        it "rejects duplicate names within a catalog" {
            db.create_catalog_entry(Catalog::Theme, CreateCatalogEntryInput {
                name: "gruvbox".to_string(),
                url: None,
                description: None,
            }).expect("Failed to create");

            let err = db.create_catalog_entry(Catalog::Theme, CreateCatalogEntryInput {
                name: "gruvbox".to_string(),
                url: None,
                description: None,
            }).unwrap_err();
            assert!(matches!(err, Error::AlreadyExists { .. }));
        }

        it "deletes by name and reports absence" {
            db.create_catalog_entry(Catalog::NvimPlugin, CreateCatalogEntryInput {
                name: "harpoon".to_string(),
                url: None,
                description: None,
            }).expect("Failed to create");

            assert!(db.delete_catalog_entry(Catalog::NvimPlugin, "harpoon").expect("Delete failed"));
            assert!(!db.delete_catalog_entry(Catalog::NvimPlugin, "harpoon").expect("Delete failed"));
        }

        it "lists names in order" {
            for name in ["zsh-autosuggestions", "bat", "fzf"] {
                db.create_catalog_entry(Catalog::TerminalPackage, CreateCatalogEntryInput {
                    name: name.to_string(),
                    url: None,
                    description: None,
                }).expect("Failed to create");
            }

            let names = db.catalog_names(Catalog::TerminalPackage).expect("Query failed");
            assert_eq!(names, vec!["bat", "fzf", "zsh-autosuggestions"]);
        }
    }

    describe "active_context" {
        it "starts with every level null" {
            let ctx = db.get_context().expect("Query failed");
            assert!(ctx.ecosystem_id.is_none());
            assert!(ctx.domain_id.is_none());
            assert!(ctx.app_id.is_none());
            assert!(ctx.workspace_id.is_none());
        }

        it "persists one level without touching the others" {
            let (ecosystem, _, _) = create_test_hierarchy(&db);
            db.set_active(ContextLevel::Ecosystem, Some(ecosystem.id)).expect("Set failed");

            let ctx = db.get_context().expect("Query failed");
            assert_eq!(ctx.ecosystem_id, Some(ecosystem.id));
            assert!(ctx.domain_id.is_none());
        }

        it "clears a level with None" {
            let (ecosystem, _, _) = create_test_hierarchy(&db);
            db.set_active(ContextLevel::Ecosystem, Some(ecosystem.id)).expect("Set failed");
            db.set_active(ContextLevel::Ecosystem, None).expect("Clear failed");

            let ctx = db.get_context().expect("Query failed");
            assert!(ctx.ecosystem_id.is_none());
        }

        it "is pruned when the selected workspace is deleted" {
            let (ecosystem, domain, app) = create_test_hierarchy(&db);
            let workspace = create_test_workspace(&db, app.id, "dev");
            db.set_active(ContextLevel::Ecosystem, Some(ecosystem.id)).expect("Set failed");
            db.set_active(ContextLevel::Domain, Some(domain.id)).expect("Set failed");
            db.set_active(ContextLevel::App, Some(app.id)).expect("Set failed");
            db.set_active(ContextLevel::Workspace, Some(workspace.id)).expect("Set failed");

            assert!(db.delete_workspace(workspace.id).expect("Failed to delete"));

            let ctx = db.get_context().expect("Query failed");
            assert!(ctx.workspace_id.is_none());
            assert_eq!(ctx.app_id, Some(app.id));
        }

        it "is pruned down the whole chain when an ancestor is deleted" {
            let (ecosystem, domain, app) = create_test_hierarchy(&db);
            let workspace = create_test_workspace(&db, app.id, "dev");
            db.set_active(ContextLevel::Ecosystem, Some(ecosystem.id)).expect("Set failed");
            db.set_active(ContextLevel::Domain, Some(domain.id)).expect("Set failed");
            db.set_active(ContextLevel::App, Some(app.id)).expect("Set failed");
            db.set_active(ContextLevel::Workspace, Some(workspace.id)).expect("Set failed");

            assert!(db.delete_domain(domain.id).expect("Failed to delete"));

            let ctx = db.get_context().expect("Query failed");
            assert_eq!(ctx.ecosystem_id, Some(ecosystem.id));
            assert!(ctx.domain_id.is_none());
            assert!(ctx.app_id.is_none());
            assert!(ctx.workspace_id.is_none());
        }

        it "survives deleting an unrelated sibling" {
            let (_, _, app) = create_test_hierarchy(&db);
            let kept = create_test_workspace(&db, app.id, "dev");
            let doomed = create_test_workspace(&db, app.id, "scratch");
            db.set_active(ContextLevel::Workspace, Some(kept.id)).expect("Set failed");

            assert!(db.delete_workspace(doomed.id).expect("Failed to delete"));

            let ctx = db.get_context().expect("Query failed");
            assert_eq!(ctx.workspace_id, Some(kept.id));
        }
    }

    describe "defaults" {
        it "sets, gets, and upserts" {
            db.set_default("image", "ubuntu:24.04").expect("Set failed");
            assert_eq!(db.get_default("image").expect("Query failed"), Some("ubuntu:24.04".to_string()));

            db.set_default("image", "alpine:3").expect("Upsert failed");
            assert_eq!(db.get_default("image").expect("Query failed"), Some("alpine:3".to_string()));
        }

        it "returns None for an unset key" {
            assert!(db.get_default("shell").expect("Query failed").is_none());
        }

        it "deletes and lists" {
            db.set_default("shell", "/bin/zsh").expect("Set failed");
            db.set_default("image", "alpine:3").expect("Set failed");

            assert!(db.delete_default("shell").expect("Delete failed"));
            assert!(!db.delete_default("shell").expect("Delete failed"));

            let defaults = db.list_defaults().expect("Query failed");
            assert_eq!(defaults, vec![("image".to_string(), "alpine:3".to_string())]);
        }
    }
}
