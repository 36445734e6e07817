//! # ludo-server
//!
//! axum HTTP surface for the snapshot subsystem:
//!
//! - `POST /admin/backup` returns the current dataset as a snapshot download.
//! - `POST /admin/restore` replaces the dataset with an uploaded snapshot.
//!
//! Both routes require an admin bearer token.

pub mod error;
pub mod extract;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use ludo_auth::{StaticTokenVerifier, TokenVerifier};
use ludo_config::LudoConfig;
use ludo_db::service::StoreService;
use tracing::{info, warn};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StoreService>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// State with the verifier and body limit taken from `config`.
    #[must_use]
    pub fn from_config(service: Arc<StoreService>, config: &LudoConfig) -> Self {
        let verifier = StaticTokenVerifier::from_config(&config.auth);
        if verifier.is_empty() {
            warn!("no admin tokens configured; every admin request will be refused");
        }
        Self {
            service,
            verifier: Arc::new(verifier),
            max_upload_bytes: config.server.max_upload_bytes,
        }
    }
}

/// Build the admin router.
pub fn router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/admin/backup", post(handlers::backup::backup))
        .route("/admin/restore", post(handlers::restore::restore))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Serve the admin API until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn run(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Admin API listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Admin API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for Ctrl-C; shutting down");
    }
}
