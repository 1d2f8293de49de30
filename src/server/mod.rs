//! HTTP surface
//!
//! A single route, `GET /properties`, backed by [`ListingService`]. Every
//! request failure answers 404 with `{"error": "<message>"}`.

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::app::ListingService;
use crate::constants::server;

pub mod handlers;

/// State shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<ListingService>,
}

impl AppState {
    pub fn new(service: Arc<ListingService>) -> Self {
        Self { service }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(server::PROPERTIES_ROUTE, get(handlers::get_properties))
        .with_state(state)
}

/// Serve `app` on `listener` until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    match listener.local_addr() {
        Ok(address) => info!(address = %address, "Listing proxy listening"),
        Err(e) => error!(error = %e, "Could not read listener address"),
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
