use anyhow::{anyhow, Result};
use api_ingress::ApiIngress;
use catalog::{Catalog, CatalogConfig, CatalogStore, StoreOptions};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// CineGraph Server - GraphQL API for users and movies
#[derive(Parser)]
#[command(name = "cinegraph-server")]
#[command(about = "CineGraph Server - GraphQL API for users and movies")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use the in-memory store instead of MongoDB
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Print the GraphQL schema (SDL)
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // `.env` fills PORT / MONGODB_URL / APP__* without overriding the real environment.
    let dotenv_path = dotenvy::dotenv().ok();

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("CineGraph Server starting");
    if let Some(path) = &dotenv_path {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(&config, &args),
        Commands::Schema => print_schema(&config),
    }
}

/// Accept only MongoDB connection strings. Full parsing (hosts, options) is left
/// to the driver since replica-set URLs are not valid generic URLs.
fn validate_mongo_url(cfg: &DatabaseConfig) -> Result<()> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let (scheme, _) = raw
        .split_once("://")
        .ok_or_else(|| anyhow!("Invalid database DSN '{}': missing scheme", redact_dsn(raw)))?;
    match scheme {
        "mongodb" | "mongodb+srv" => Ok(()),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Mask the password of a connection string for logging.
fn redact_dsn(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("***")).is_err() {
                return "<redacted>".to_string();
            }
            url.to_string()
        }
        Ok(url) => url.to_string(),
        // Multi-host strings: drop everything before '@'.
        Err(_) => match raw.split_once("://").zip(raw.rsplit_once('@')) {
            Some(((scheme, _), (_, rest))) => format!("{scheme}://***@{rest}"),
            None => raw.to_string(),
        },
    }
}

/// Build the store handle. A failed ping is logged and startup continues;
/// requests fail with the driver error until the database is reachable, and
/// user writes create the unique indexes before touching the collection.
async fn connect_store(db: &DatabaseConfig) -> Result<CatalogStore> {
    validate_mongo_url(db)?;
    tracing::info!("Connecting to database: {}", redact_dsn(&db.url));

    let opts = StoreOptions {
        url: db.url.trim().to_owned(),
        database: db.name.clone(),
        connect_timeout: db.connect_timeout_ms.map(Duration::from_millis),
    };
    let store = CatalogStore::connect(&opts).await?;

    match store.ping().await {
        Ok(()) => tracing::info!(database = %store.database_name(), "Connected to MongoDB"),
        Err(e) => tracing::error!(error = %format!("{e:#}"), "MongoDB connection failed"),
    }
    if let Err(e) = store.ensure_indexes().await {
        tracing::warn!(
            error = %format!("{e:#}"),
            "Could not ensure MongoDB indexes; retrying on the first user write"
        );
    }

    Ok(store)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let ingress = ApiIngress::from_app_config(&config)?;
    let catalog_cfg = config.module_config::<CatalogConfig>(catalog::MODULE_NAME)?;

    let (catalog, store) = if args.mock {
        tracing::info!("Using in-memory store (--mock)");
        (Catalog::in_memory(&catalog_cfg), None)
    } else {
        let db = config.database.clone().unwrap_or_default();
        let store = connect_store(&db).await?;
        (Catalog::from_store(&store, &catalog_cfg), Some(store))
    };

    let api = ingress.config();
    let router = catalog.register_routes(ingress.base_router(), &api.graphql_path, api.graphiql);
    let router = ingress.finalize(router);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = runtime::shutdown::wait_for_shutdown().await {
                tracing::warn!(error = %e, "Signal handling failed; shutting down");
            }
            cancel.cancel();
        }
    });

    let served = ingress.serve(router, cancel).await;

    if let Some(store) = store {
        store.shutdown().await;
        tracing::info!("Database client closed");
    }
    served
}

fn check_config(config: &AppConfig, args: &CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let ingress = ApiIngress::from_app_config(config)?;
    config.module_config::<CatalogConfig>(catalog::MODULE_NAME)?;
    if !args.mock {
        validate_mongo_url(&config.database.clone().unwrap_or_default())?;
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Listening address: {}", ingress.bind_addr());
    println!("{}", config.to_yaml()?);

    Ok(())
}

fn print_schema(config: &AppConfig) -> Result<()> {
    let catalog_cfg = config.module_config::<CatalogConfig>(catalog::MODULE_NAME)?;
    println!("{}", Catalog::in_memory(&catalog_cfg).sdl());
    Ok(())
}
