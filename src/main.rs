// LoveNest - a small shared home page for two
// Serves the photo wall, the two music shelves and their uploads over HTTP

use anyhow::{Context, Result};
use clap::Parser;
use lovenest::{router, AppState, Config, MediaCatalog};
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lovenest")]
#[command(about = "Photos, songs and settings for two, served over HTTP")]
struct Args {
    /// Enable developer logging (stderr + debug output)
    #[arg(long)]
    dev: bool,

    /// Config file to use instead of the per-user one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind to
    #[arg(long)]
    bind: Option<String>,

    /// Keep data/ and uploads/ under this directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Built front-end to serve for non-API paths
    #[arg(long)]
    web_dir: Option<PathBuf>,
}

/// Daily rotating log file, plus stderr in dev mode. Keep the guard alive
/// for as long as logs should be flushed.
fn init_logging(config: &Config, dev: bool) -> Result<WorkerGuard> {
    let log_dir = &config.logging.log_dir;
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, &config.logging.file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Base filter: info level for general logs, debug for lovenest
    let base_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lovenest=debug,tower_http=debug"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    let stderr_layer = dev.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(base_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().context("loading config")?,
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(base_dir) = &args.data_dir {
        let max_upload_bytes = config.storage.max_upload_bytes;
        config.storage = lovenest::config::StorageConfig::rooted_at(base_dir);
        config.storage.max_upload_bytes = max_upload_bytes;
    }
    if let Some(web_dir) = &args.web_dir {
        config.server.web_dir = Some(web_dir.clone());
    }

    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    let _log_guard = init_logging(&config, args.dev)?;

    info!("💞 LoveNest starting up");

    // a corrupt collection stops us here rather than serving empty lists
    let catalog = MediaCatalog::open(&config.storage).with_context(|| {
        format!("opening catalog in {}", config.storage.data_dir.display())
    })?;

    let app = router(AppState::new(catalog), config.server.web_dir.as_deref());

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;

    info!("LoveNest listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("LoveNest stopped");
    Ok(())
}
