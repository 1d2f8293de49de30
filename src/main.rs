//! Listing proxy server
//!
//! Loads configuration, wires the upstream client, cache and request core
//! together and serves `GET /properties` until Ctrl-C.

use std::process;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use listing_proxy::app::{
    BucketCache, CachePopulator, EligibilityRules, HttpListingSource, ListingService, SystemClock,
};
use listing_proxy::cli::{init_logging, log_filter, Cli};
use listing_proxy::config::AppConfig;
use listing_proxy::server::{self, AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    let mut config = AppConfig::load(cli.config.clone())
        .await
        .context("Failed to load configuration")?;

    init_logging(
        &log_filter(cli.log_level(), &config.logging.level),
        cli.very_verbose,
    );
    info!("Listing proxy v{} starting", env!("CARGO_PKG_VERSION"));
    match &config.loaded_from {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    config.apply_env();
    config.apply_overrides(&cli.overrides());

    let config = config.validate().context("Invalid configuration")?;
    debug!(
        upstream = %config.upstream_url,
        bind_address = %config.bind_address,
        ttl = ?config.cache.ttl,
        "Configuration loaded"
    );

    let source = HttpListingSource::new(config.upstream_url.clone(), &config.client)
        .context("Failed to build upstream client")?;
    let cache = Arc::new(BucketCache::new(config.cache.ttl));

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let sweeper = cache.spawn_sweeper(config.cache.cleanup_interval, shutdown_tx.subscribe());

    let populator = CachePopulator::new(
        Arc::new(source),
        Arc::clone(&cache),
        EligibilityRules::default(),
        Arc::new(SystemClock),
    );
    let service = ListingService::with_datasources(Arc::new(populator), config.datasources);
    let app = server::router(AppState::new(Arc::new(service)));

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;

    let served = server::serve(listener, app, server::shutdown_signal()).await;

    let _ = shutdown_tx.send(());
    if let Err(e) = sweeper.await {
        error!(error = %e, "Cache sweeper did not stop cleanly");
    }

    let stats = cache.stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        "Server shutdown complete"
    );

    served.context("Server error")
}
