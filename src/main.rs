use std::str::FromStr;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use berth::context::{EnvOverrides, Resolver, CLEAR_SENTINEL};
use berth::db::Database;
use berth::error::Error;
use berth::models::*;
use berth::output::{self, OutputFormat};
use berth::platform::{self, SystemProbe};
use berth::registry::{self, CreateSpec, Kind, Registry, Resource, ResourceContext, ResourceScope};
use berth::runtime::{container_name, CliBackend, ContainerBackend, ContainerRuntime, StartAction};
use berth::{plugins, Result};

#[derive(Parser)]
#[command(name = "berth")]
#[command(about = "Containerized development workspace manager")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the active ecosystem, domain, app, or workspace ("none" clears it)
    Use {
        /// Hierarchy level: ecosystem | domain | app | workspace
        level: String,
        /// Entity name, or "none" to clear this level and everything below it
        name: String,
    },
    /// Show the active selection at all four levels
    Context,
    /// Create a resource
    Create {
        /// Resource kind (ecosystem, domain, app, workspace, plugin, theme, terminal-package)
        kind: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Source repository URL (catalog kinds)
        #[arg(long)]
        url: Option<String>,
        /// Container image (workspaces; defaults to the `image` config key)
        #[arg(long)]
        image: Option<String>,
        /// Owning app (workspaces; overrides the active context)
        #[arg(long)]
        app: Option<String>,
        #[arg(short, long, value_enum, default_value_t)]
        output: OutputFormat,
    },
    /// Show one resource by name
    Get {
        kind: String,
        name: String,
        /// Owning app (workspaces; overrides the active context)
        #[arg(long)]
        app: Option<String>,
        #[arg(short, long, value_enum, default_value_t)]
        output: OutputFormat,
    },
    /// List resources of a kind
    List {
        kind: String,
        /// Owning app (workspaces; overrides the active context)
        #[arg(long)]
        app: Option<String>,
        #[arg(short, long, value_enum, default_value_t)]
        output: OutputFormat,
    },
    /// Delete a resource by name
    Delete {
        kind: String,
        name: String,
        /// Owning app (workspaces; overrides the active context)
        #[arg(long)]
        app: Option<String>,
    },
    /// Update a workspace's description or image
    Update {
        kind: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
    /// Manage a workspace's configured plugin set
    Plugins {
        #[command(subcommand)]
        command: PluginsCommand,
    },
    /// Start (creating if needed) a workspace's container
    Start {
        workspace: Option<String>,
        #[arg(long)]
        app: Option<String>,
    },
    /// Stop a workspace's container
    Stop {
        workspace: Option<String>,
        #[arg(long)]
        app: Option<String>,
    },
    /// Open an interactive shell in a workspace's container
    Attach {
        workspace: Option<String>,
        #[arg(long)]
        app: Option<String>,
        /// Shell to exec (defaults to the `shell` config key, then /bin/bash)
        #[arg(long)]
        shell: Option<String>,
    },
    /// Stop every berth-managed container
    StopAll,
    /// Show detected container platforms
    Platforms {
        /// Show every reachable platform, not just the selected one
        #[arg(long)]
        all: bool,
        #[arg(short, long, value_enum, default_value_t)]
        output: OutputFormat,
    },
    /// Manage configuration defaults
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum PluginsCommand {
    /// List the workspace's configured plugins
    List {
        #[arg(long)]
        workspace: Option<String>,
        #[arg(long)]
        app: Option<String>,
    },
    /// Add plugins from the global catalog to the workspace's set
    Add {
        names: Vec<String>,
        #[arg(long)]
        workspace: Option<String>,
        #[arg(long)]
        app: Option<String>,
    },
    /// Remove plugins from the workspace's set
    Remove {
        names: Vec<String>,
        #[arg(long)]
        workspace: Option<String>,
        #[arg(long)]
        app: Option<String>,
    },
    /// Empty the workspace's set (leaving an explicitly empty set)
    Clear {
        #[arg(long)]
        workspace: Option<String>,
        #[arg(long)]
        app: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
    List,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "berth=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let db = Database::open_default()?;
    db.migrate()?;
    let resolver = Resolver::new(db.clone(), EnvOverrides::from_env());

    match cli.command {
        Commands::Use { level, name } => cmd_use(&db, &resolver, &level, &name)?,
        Commands::Context => cmd_context(&db)?,
        Commands::Create {
            kind,
            name,
            description,
            url,
            image,
            app,
            output,
        } => {
            let spec = CreateSpec {
                name,
                description,
                url,
                image,
            };
            cmd_create(&db, &resolver, &kind, spec, app, output)?;
        }
        Commands::Get {
            kind,
            name,
            app,
            output,
        } => {
            let kind = Kind::from_str(&kind)?;
            let ctx = resource_context(&db, &resolver, app, output)?;
            let resource = registry::get(&Registry::standard(), &ctx, kind, &name)?;
            println!("{}", output::render_resource(&resource, output)?);
        }
        Commands::List { kind, app, output } => {
            let kind = Kind::from_str(&kind)?;
            let ctx = resource_context(&db, &resolver, app, output)?;
            let resources = registry::list(&Registry::standard(), &ctx, kind)?;
            println!("{}", output::render_resources(&resources, output)?);
        }
        Commands::Delete { kind, name, app } => {
            let kind = Kind::from_str(&kind)?;
            let ctx = resource_context(&db, &resolver, app, OutputFormat::Table)?;
            registry::delete(&Registry::standard(), &ctx, kind, &name)?;
            println!("deleted {} '{}'", kind, name);
        }
        Commands::Update {
            kind,
            name,
            description,
            image,
        } => cmd_update(&db, &resolver, &kind, &name, description, image)?,
        Commands::Plugins { command } => cmd_plugins(&db, &resolver, command)?,
        Commands::Start { workspace, app } => cmd_start(&db, &resolver, workspace, app).await?,
        Commands::Stop { workspace, app } => cmd_stop(&db, &resolver, workspace, app).await?,
        Commands::Attach {
            workspace,
            app,
            shell,
        } => cmd_attach(&db, &resolver, workspace, app, shell).await?,
        Commands::StopAll => cmd_stop_all().await?,
        Commands::Platforms { all, output } => cmd_platforms(all, output)?,
        Commands::Config { command } => cmd_config(&db, command)?,
    }

    Ok(())
}

/// Build the registry dispatch context from the persisted active context.
/// An `--app` flag overrides the app (and its domain) in the scope.
fn resource_context(
    db: &Database,
    resolver: &Resolver,
    app_flag: Option<String>,
    format: OutputFormat,
) -> Result<ResourceContext> {
    let active = db.get_context()?;
    let mut scope = ResourceScope::from_context(&active);
    if app_flag.is_some() {
        let app = resolver.app(app_flag.as_deref())?;
        scope.domain_id = Some(app.domain_id);
        scope.app_id = Some(app.id);
    }
    Ok(ResourceContext {
        db: db.clone(),
        scope,
        format,
    })
}

fn parse_level(level: &str) -> anyhow::Result<ContextLevel> {
    ContextLevel::from_str(level)
        .ok_or_else(|| anyhow::anyhow!("unknown hierarchy level '{}'", level))
}

fn cmd_use(db: &Database, resolver: &Resolver, level: &str, name: &str) -> anyhow::Result<()> {
    let level = parse_level(level)?;

    if name == CLEAR_SENTINEL {
        resolver.clear_active(level)?;
        println!("cleared active {} (and everything below it)", level);
        return Ok(());
    }

    // Validate existence before touching the context; the resolver itself
    // does not re-validate.
    let id = match level {
        ContextLevel::Ecosystem => {
            db.get_ecosystem_by_name(name)?
                .ok_or_else(|| Error::not_found("ecosystem", name))?
                .id
        }
        ContextLevel::Domain => {
            let ecosystem = resolver.ecosystem()?;
            db.get_domain_by_name(ecosystem.id, name)?
                .ok_or_else(|| Error::not_found("domain", name))?
                .id
        }
        ContextLevel::App => {
            let domain = resolver.domain()?;
            db.get_app_by_name(domain.id, name)?
                .ok_or_else(|| Error::not_found("app", name))?
                .id
        }
        ContextLevel::Workspace => {
            let app = resolver.app(None)?;
            db.get_workspace_by_name(app.id, name)?
                .ok_or_else(|| Error::not_found("workspace", name))?
                .id
        }
    };

    resolver.set_active(level, id)?;
    println!("active {} is now '{}'", level, name);
    Ok(())
}

fn cmd_context(db: &Database) -> Result<()> {
    let active = db.get_context()?;

    let print_level = |label: &str, value: Option<String>| match value {
        Some(name) => println!("{:<10} {}", label, name),
        None => println!("{:<10} (none)", label),
    };

    print_level(
        "ecosystem",
        active
            .ecosystem_id
            .and_then(|id| db.get_ecosystem(id).ok().flatten())
            .map(|e| e.name),
    );
    print_level(
        "domain",
        active
            .domain_id
            .and_then(|id| db.get_domain(id).ok().flatten())
            .map(|d| d.name),
    );
    print_level(
        "app",
        active
            .app_id
            .and_then(|id| db.get_app(id).ok().flatten())
            .map(|a| a.name),
    );
    print_level(
        "workspace",
        active
            .workspace_id
            .and_then(|id| db.get_workspace(id).ok().flatten())
            .map(|w| w.name),
    );
    Ok(())
}

fn cmd_create(
    db: &Database,
    resolver: &Resolver,
    kind: &str,
    spec: CreateSpec,
    app_flag: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let kind = Kind::from_str(kind)?;

    // Domain creation stays on the hierarchy surface; everything else goes
    // through the registry.
    if kind == Kind::Domain {
        let ecosystem = resolver.ecosystem()?;
        let domain = db.create_domain(
            ecosystem.id,
            CreateDomainInput {
                name: spec.name,
                description: spec.description,
            },
        )?;
        println!(
            "{}",
            output::render_resource(&Resource::Domain(domain), format)?
        );
        return Ok(());
    }

    let ctx = resource_context(db, resolver, app_flag, format)?;
    let resource = registry::create(&Registry::standard(), &ctx, kind, &spec)?;
    println!("{}", output::render_resource(&resource, format)?);
    Ok(())
}

fn cmd_update(
    db: &Database,
    resolver: &Resolver,
    kind: &str,
    name: &str,
    description: Option<String>,
    image: Option<String>,
) -> anyhow::Result<()> {
    if Kind::from_str(kind)? != Kind::Workspace {
        anyhow::bail!("update is only supported for workspaces");
    }

    let (_, workspace) = resolver.workspace(Some(name), None)?;
    db.update_workspace(
        workspace.id,
        UpdateWorkspaceInput {
            name: None,
            description,
            image,
            status: None,
        },
    )?;
    println!("updated workspace '{}'", workspace.name);
    Ok(())
}

fn cmd_plugins(db: &Database, resolver: &Resolver, command: PluginsCommand) -> Result<()> {
    match command {
        PluginsCommand::List { workspace, app } => {
            let (_, ws) = resolver.workspace(workspace.as_deref(), app.as_deref())?;
            if ws.plugins.is_none() {
                println!("no explicit plugin set; the full global plugin library applies");
                return Ok(());
            }
            let names = plugins::list_plugins(&ws);
            if names.is_empty() {
                println!("plugin set is explicitly empty");
            }
            for name in names {
                println!("{}", name);
            }
        }
        PluginsCommand::Add {
            names,
            workspace,
            app,
        } => {
            let (_, mut ws) = resolver.workspace(workspace.as_deref(), app.as_deref())?;
            let global = db.catalog_names(Catalog::NvimPlugin)?;
            let outcome = plugins::add_plugins(&mut ws, &names, &global);
            db.save_workspace_plugins(&ws)?;
            for name in &outcome.added {
                println!("added {}", name);
            }
            for name in &outcome.skipped {
                println!("skipped {} (already configured)", name);
            }
            for name in &outcome.not_found {
                println!("not found in plugin catalog: {}", name);
            }
        }
        PluginsCommand::Remove {
            names,
            workspace,
            app,
        } => {
            let (_, mut ws) = resolver.workspace(workspace.as_deref(), app.as_deref())?;
            let outcome = plugins::remove_plugins(&mut ws, &names);
            db.save_workspace_plugins(&ws)?;
            for name in &outcome.removed {
                println!("removed {}", name);
            }
            for name in &outcome.not_found {
                println!("not configured: {}", name);
            }
        }
        PluginsCommand::Clear { workspace, app } => {
            let (_, mut ws) = resolver.workspace(workspace.as_deref(), app.as_deref())?;
            let removed = plugins::clear_plugins(&mut ws);
            db.save_workspace_plugins(&ws)?;
            println!("cleared {} plugin(s)", removed);
        }
    }
    Ok(())
}

async fn cmd_start(
    db: &Database,
    resolver: &Resolver,
    workspace: Option<String>,
    app: Option<String>,
) -> Result<()> {
    let (owner, ws) = resolver.workspace(workspace.as_deref(), app.as_deref())?;
    let runtime = connect_runtime().await?;
    let name = container_name(&owner.name, &ws.name);

    let action = runtime.start_workspace(&name, &ws.image).await?;
    record_status(db, &ws, &runtime, &name).await?;

    match action {
        StartAction::Created => println!("created and started container {}", name),
        StartAction::Started => println!("started container {}", name),
        StartAction::AlreadyRunning => println!("container {} is already running", name),
    }
    Ok(())
}

async fn cmd_stop(
    db: &Database,
    resolver: &Resolver,
    workspace: Option<String>,
    app: Option<String>,
) -> Result<()> {
    let (owner, ws) = resolver.workspace(workspace.as_deref(), app.as_deref())?;
    let runtime = connect_runtime().await?;
    let name = container_name(&owner.name, &ws.name);

    let stopped = runtime.stop_workspace(&name).await?;
    record_status(db, &ws, &runtime, &name).await?;

    if stopped {
        println!("stopped container {}", name);
    } else {
        println!("container {} was not running", name);
    }
    Ok(())
}

async fn cmd_attach(
    db: &Database,
    resolver: &Resolver,
    workspace: Option<String>,
    app: Option<String>,
    shell: Option<String>,
) -> Result<()> {
    let (owner, ws) = resolver.workspace(workspace.as_deref(), app.as_deref())?;
    let runtime = connect_runtime().await?;
    let name = container_name(&owner.name, &ws.name);

    let shell = match shell {
        Some(shell) => shell,
        None => db
            .get_default("shell")?
            .unwrap_or_else(|| "/bin/bash".to_string()),
    };

    runtime.attach_workspace(&name, &shell).await
}

async fn cmd_stop_all() -> Result<()> {
    let runtime = connect_runtime().await?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let outcome = runtime.stop_all_workspaces(&cancel).await?;
    println!("stopped {} container(s)", outcome.stopped);
    for failure in &outcome.failed {
        eprintln!("failed to stop {}: {}", failure.name, failure.error);
    }
    Ok(())
}

fn cmd_platforms(all: bool, format: OutputFormat) -> Result<()> {
    let probe = SystemProbe;
    if all {
        let detected = platform::detect_all(&probe);
        println!("{}", output::render_platforms(&detected, format)?);
    } else {
        let chosen = platform::detect(&probe)?;
        println!(
            "{}",
            output::render_platforms(std::slice::from_ref(&chosen), format)?
        );
    }
    Ok(())
}

fn cmd_config(db: &Database, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Get { key } => match db.get_default(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(unset)"),
        },
        ConfigCommand::Set { key, value } => {
            db.set_default(&key, &value)?;
        }
        ConfigCommand::Unset { key } => {
            db.delete_default(&key)?;
        }
        ConfigCommand::List => {
            for (key, value) in db.list_defaults()? {
                println!("{} = {}", key, value);
            }
        }
    }
    Ok(())
}

/// Detect the platform and verify it answers before any lifecycle call.
async fn connect_runtime() -> Result<ContainerRuntime<CliBackend>> {
    let detected = platform::detect(&SystemProbe)?;
    let backend = CliBackend::from_platform(&detected);
    backend.ping().await?;
    Ok(ContainerRuntime::new(backend))
}

/// Write the container's current normalized status back onto the workspace
/// row. A status refresh failure never fails the surrounding command.
async fn record_status(
    db: &Database,
    ws: &Workspace,
    runtime: &ContainerRuntime<CliBackend>,
    name: &str,
) -> Result<()> {
    let status = match runtime.find_workspace(name).await {
        Ok(Some(status)) => status.as_str().to_string(),
        Ok(None) => "absent".to_string(),
        Err(e) => {
            tracing::warn!(container = name, error = %e, "could not refresh container status");
            return Ok(());
        }
    };
    db.update_workspace(
        ws.id,
        UpdateWorkspaceInput {
            name: None,
            description: None,
            image: None,
            status: Some(status),
        },
    )?;
    Ok(())
}
