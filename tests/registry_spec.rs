use std::str::FromStr;

use berth::db::Database;
use berth::error::Error;
use berth::models::*;
use berth::output::OutputFormat;
use berth::registry::{
    self, CreateSpec, Kind, Registry, Resource, ResourceContext, ResourceScope,
};
use speculate2::speculate;

fn context_with_scope(db: &Database, scope: ResourceScope) -> ResourceContext {
    ResourceContext {
        db: db.clone(),
        scope,
        format: OutputFormat::Table,
    }
}

fn setup_scope(db: &Database) -> ResourceScope {
    let ecosystem = db
        .create_ecosystem(CreateEcosystemInput {
            name: "work".to_string(),
            description: None,
        })
        .expect("Failed to create ecosystem");
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
    ResourceScope {
        ecosystem_id: Some(ecosystem.id),
        domain_id: Some(domain.id),
        app_id: Some(app.id),
    }
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
        let registry = Registry::standard();
    }

    describe "dispatch" {
        it "creates, gets, lists, and deletes ecosystems" {
            let ctx = context_with_scope(&db, ResourceScope::default());

            let created = registry::create(&registry, &ctx, Kind::Ecosystem, &CreateSpec {
                name: "personal".to_string(),
                ..CreateSpec::default()
            }).expect("Create failed");
            assert_eq!(created.kind(), Kind::Ecosystem);

            let fetched = registry::get(&registry, &ctx, Kind::Ecosystem, "personal").expect("Get failed");
            assert_eq!(fetched.name(), "personal");

            assert_eq!(registry::list(&registry, &ctx, Kind::Ecosystem).expect("List failed").len(), 1);

            registry::delete(&registry, &ctx, Kind::Ecosystem, "personal").expect("Delete failed");
            let err = registry::get(&registry, &ctx, Kind::Ecosystem, "personal").unwrap_err();
            assert!(matches!(err, Error::NotFound { .. }));
        }

        it "fails with UnsupportedKind when no handler is bound" {
            let empty = Registry::new();
            let ctx = context_with_scope(&db, ResourceScope::default());

            let err = registry::list(&empty, &ctx, Kind::Workspace).unwrap_err();
            assert!(matches!(err, Error::UnsupportedKind(_)));

            // The standard registry has the handler; its failure here is
            // scoping, not dispatch.
            let err = registry::list(&registry, &ctx, Kind::Workspace).unwrap_err();
            assert!(matches!(err, Error::NoActiveContext { .. }));
        }

        it "fails create with NotSupported for domains" {
            let scope = setup_scope(&db);
            let ctx = context_with_scope(&db, scope);

            let err = registry::create(&registry, &ctx, Kind::Domain, &CreateSpec {
                name: "frontend".to_string(),
                ..CreateSpec::default()
            }).unwrap_err();
            assert!(matches!(err, Error::NotSupported { operation: "create", .. }));
        }
    }

    describe "scoping" {
        it "scopes hierarchy kinds to the active ancestors" {
            let scope = setup_scope(&db);
            let ctx = context_with_scope(&db, scope);

            let ws = registry::create(&registry, &ctx, Kind::Workspace, &CreateSpec {
                name: "dev".to_string(),
                image: Some("alpine:3".to_string()),
                ..CreateSpec::default()
            }).expect("Create failed");
            assert_eq!(ws.as_workspace().expect("Accessor failed").image, "alpine:3");

            let listed = registry::list(&registry, &ctx, Kind::Workspace).expect("List failed");
            assert_eq!(listed.len(), 1);
        }

        it "requires the ancestor level in scope" {
            let ctx = context_with_scope(&db, ResourceScope::default());

            let err = registry::list(&registry, &ctx, Kind::Domain).unwrap_err();
            assert!(matches!(err, Error::NoActiveContext { level: ContextLevel::Ecosystem }));

            let err = registry::list(&registry, &ctx, Kind::Workspace).unwrap_err();
            assert!(matches!(err, Error::NoActiveContext { level: ContextLevel::App }));
        }

        it "serves catalog kinds without any scope" {
            let ctx = context_with_scope(&db, ResourceScope::default());

            registry::create(&registry, &ctx, Kind::Theme, &CreateSpec {
                name: "gruvbox".to_string(),
                url: Some("https://github.com/morhetz/gruvbox".to_string()),
                ..CreateSpec::default()
            }).expect("Create failed");

            let listed = registry::list(&registry, &ctx, Kind::Theme).expect("List failed");
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].name(), "gruvbox");
        }

        it "defaults the workspace image from the defaults map" {
            let scope = setup_scope(&db);
            db.set_default("image", "debian:12").expect("Set failed");
            let ctx = context_with_scope(&db, scope);

            let ws = registry::create(&registry, &ctx, Kind::Workspace, &CreateSpec {
                name: "dev".to_string(),
                ..CreateSpec::default()
            }).expect("Create failed");
            assert_eq!(ws.as_workspace().expect("Accessor failed").image, "debian:12");
        }
    }

    describe "resource projection" {
        it "tags the json projection with the kind" {
            let ctx = context_with_scope(&db, ResourceScope::default());
            let resource = registry::create(&registry, &ctx, Kind::NvimPlugin, &CreateSpec {
                name: "telescope".to_string(),
                ..CreateSpec::default()
            }).expect("Create failed");

            let value: serde_json::Value =
                serde_json::from_str(&resource.to_json().expect("Projection failed")).unwrap();
            assert_eq!(value["kind"], "nvim-plugin");
            assert_eq!(value["name"], "telescope");
        }

        it "projects to yaml" {
            let ctx = context_with_scope(&db, ResourceScope::default());
            let resource = registry::create(&registry, &ctx, Kind::Theme, &CreateSpec {
                name: "gruvbox".to_string(),
                ..CreateSpec::default()
            }).expect("Create failed");

            let yaml = resource.to_yaml().expect("Projection failed");
            assert!(yaml.contains("kind: theme"));
            assert!(yaml.contains("name: gruvbox"));
        }

        it "fails typed accessors on a kind mismatch instead of panicking" {
            let ctx = context_with_scope(&db, ResourceScope::default());
            let resource = registry::create(&registry, &ctx, Kind::Ecosystem, &CreateSpec {
                name: "work".to_string(),
                ..CreateSpec::default()
            }).expect("Create failed");

            assert!(resource.as_ecosystem().is_ok());
            let err = resource.as_workspace().unwrap_err();
            assert!(matches!(err, Error::UnsupportedKind(k) if k == "ecosystem"));
        }
    }
}

#[test]
fn test_kind_parsing_accepts_aliases_and_plural_forms() {
    assert_eq!(Kind::from_str("eco").unwrap(), Kind::Ecosystem);
    assert_eq!(Kind::from_str("ecosystems").unwrap(), Kind::Ecosystem);
    assert_eq!(Kind::from_str("ws").unwrap(), Kind::Workspace);
    assert_eq!(Kind::from_str("plugins").unwrap(), Kind::NvimPlugin);
    assert_eq!(Kind::from_str("Theme").unwrap(), Kind::Theme);
    assert_eq!(
        Kind::from_str("terminal-packages").unwrap(),
        Kind::TerminalPackage
    );
}

#[test]
fn test_kind_parsing_rejects_unknown_kinds() {
    let err = Kind::from_str("gadget").unwrap_err();
    assert!(matches!(err, Error::UnsupportedKind(k) if k == "gadget"));
}

#[test]
fn test_resources_expose_name_and_description_uniformly() {
    let eco = Resource::Ecosystem(Ecosystem {
        id: uuid::Uuid::new_v4(),
        name: "work".to_string(),
        description: Some("day job".to_string()),
        created_at: chrono::Utc::now(),
    });
    assert_eq!(eco.name(), "work");
    assert_eq!(eco.description(), Some("day job"));
}
