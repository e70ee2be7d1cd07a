//! HTTP server for the bookshelf.
//!
//! Loads the book at startup, serves it until Ctrl-C or SIGTERM, then
//! waits for in-flight requests and stores the book.

use anyhow::{Context, Result};
use bookshelf::server::{self, ServerConfig};
use bookshelf::Bookshelf;
use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bookshelf - an ordered book of pages over HTTP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "BOOKSHELF_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "BOOKSHELF_BIND")]
    bind: Option<String>,

    /// Book file to load at startup and store at shutdown
    #[arg(long, env = "BOOKSHELF_BOOK")]
    book: Option<PathBuf>,

    /// Keep the book in memory only
    #[arg(long)]
    no_persist: bool,

    /// fsync the book file when storing it
    #[arg(long)]
    sync_on_write: bool,

    /// Fail requests with 503 after waiting this long for the book lock
    #[arg(long, env = "BOOKSHELF_LOCK_TIMEOUT_MS")]
    lock_timeout_ms: Option<u64>,

    /// Log level
    #[arg(long, env = "BOOKSHELF_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    /// Layer command line flags over the file configuration
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(book) = &self.book {
            config.book_path = book.clone();
        }
        if self.no_persist {
            config.persist = false;
        }
        if self.sync_on_write {
            config.sync_on_write = true;
        }
        if let Some(ms) = self.lock_timeout_ms {
            config.lock_timeout_ms = Some(ms);
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

fn load_configuration(args: &Args) -> Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load_from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_configuration(&args)?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "bookshelf={level},bookshelf_server={level},tower_http={level}",
                    level = config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting bookshelf server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let shelf = Bookshelf::open(config.book_config()).context("failed to load book")?;
    info!(storage = %shelf.describe(), pages = shelf.store().len()?, "book ready");

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("Listening on http://{}", listener.local_addr()?);

    let served = server::serve(listener, shelf.store(), server::shutdown_signal()).await;
    if let Err(e) = &served {
        error!(error = %e, "server stopped unexpectedly");
    }
    info!("Server down, storing book");

    // Store even after a server failure; report the save error first
    if let Err(e) = shelf.close() {
        error!(error = %e, "failed to store book");
        return Err(e).context("failed to store book");
    }
    info!("Book stored");

    served.context("server error")
}
