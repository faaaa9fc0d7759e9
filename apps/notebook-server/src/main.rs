use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit_db::{
    redact_credentials_in_dsn, ConnectOpts, DbHandle, DEFAULT_SQLITE_BUSY_TIMEOUT_MS,
};
use notebook::{config::NotebookConfig, NotebookModule};
use runtime::{AppConfig, CliArgs, DatabaseConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps in-memory DSNs as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    // Rebuild DSN with absolute path and normalized slashes
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Final DSN for the configured database; relative sqlite paths live under home_dir.
fn resolve_dsn(db: &DatabaseConfig, base_dir: &Path) -> Result<String> {
    let raw = db.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    DbHandle::detect(raw).with_context(|| {
        format!(
            "Unsupported database DSN '{}'",
            redact_credentials_in_dsn(raw)
        )
    })?;
    if raw.starts_with("sqlite:") {
        absolutize_sqlite_dsn(raw, base_dir)
    } else {
        Ok(raw.to_string())
    }
}

/// Notebook Server - notebook sharing REST backend
#[derive(Parser)]
#[command(name = "notebook-server")]
#[command(about = "Notebook Server - notebook sharing REST backend")]
#[command(version)]
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

    /// Use an in-memory SQLite database
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
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity / mock db)
    config.apply_cli_overrides(&args);

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Notebook Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
    }
}

/// Everything `run` needs, validated up front so `check` can share it.
struct Plan {
    dsn: String,
    connect_opts: ConnectOpts,
    ingress: ApiIngressConfig,
    notebook: NotebookConfig,
    addr: SocketAddr,
}

fn plan(config: &AppConfig, args: &CliArgs) -> Result<Plan> {
    let db = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("database section is required"))?;
    let dsn = resolve_dsn(db, Path::new(&config.server.home_dir))?;

    let connect_opts = ConnectOpts {
        max_conns: db.max_conns.or(Some(10)),
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout_ms: db
            .busy_timeout_ms
            .map(i64::from)
            .unwrap_or(DEFAULT_SQLITE_BUSY_TIMEOUT_MS),
        create_sqlite_dirs: true,
        ..Default::default()
    };

    let mut ingress: ApiIngressConfig = config.module_config("api_ingress")?;
    let module_sets_timeout = config
        .modules
        .get("api_ingress")
        .and_then(|v| v.get("request_timeout_sec"))
        .is_some();
    if config.server.timeout_sec > 0 && !module_sets_timeout {
        ingress.request_timeout_sec = config.server.timeout_sec;
    }
    let notebook: NotebookConfig = config.module_config("notebook")?;

    // An explicit --port wins over modules.api_ingress.bind_addr.
    let server_addr = format!("{}:{}", config.server.host, config.server.port);
    let addr = if args.port.is_some() {
        server_addr
            .parse()
            .with_context(|| format!("invalid server address '{server_addr}'"))?
    } else {
        ApiIngress::new(ingress.clone()).bind_addr(&server_addr)?
    };

    Ok(Plan {
        dsn,
        connect_opts,
        ingress,
        notebook,
        addr,
    })
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let plan = plan(&config, &args)?;

    tracing::info!(
        "Connecting to database: {}",
        redact_credentials_in_dsn(&plan.dsn)
    );
    let db = DbHandle::connect(&plan.dsn, plan.connect_opts)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected DB backend: {:?}", db.engine());

    NotebookModule::migrate(&db).await?;

    let ingress = ApiIngress::new(plan.ingress);
    let module = NotebookModule::new(db.sea(), plan.notebook)?;
    let api = module.register_rest(axum::Router::new(), ingress.registry())?;
    let router = ingress.build_router(api)?;

    let shutdown = async {
        if let Err(e) = modkit::wait_for_shutdown().await {
            tracing::error!(error = %e, "signal handler failed, shutting down");
        }
    };
    ApiIngress::serve(plan.addr, router, shutdown).await?;

    db.close().await;
    tracing::info!("Notebook Server stopped");
    Ok(())
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");
    let plan = plan(&config, &args)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Database: {}", redact_credentials_in_dsn(&plan.dsn));
    println!("Listening address: {}", plan.addr);
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
