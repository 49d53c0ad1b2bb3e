use std::{env, sync::Arc};

mod core;
mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};
use crate::routes::{
    health_route::health_route, metrics_route::metrics_route,
    structural_search::structural_search_route::structural_search_route,
};

/// Listen address used when `API_ADDRESS` is unset.
pub const DEFAULT_API_ADDRESS: &str = "127.0.0.1:3181";

/// All routes with their shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/structural_search", post(structural_search_route))
        .route("/metrics", get(metrics_route))
        .route("/health", get(health_route))
        .with_state(state)
}

/// Builds state from the environment and serves until Ctrl+C.
pub async fn start() -> AppResult<()> {
    let state = Arc::new(AppState::from_env()?);
    let addr = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.into());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, "structural search api listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)
}

/// Resolves on Ctrl+C. If the handler cannot be installed the server keeps running.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
