//! HTTP server: routing, state, rendering, and error translation.

mod handlers;
mod http_error;
mod render;
mod state;

pub use http_error::ApiError;
pub use render::{escape_html, page, result_fragment};
pub use state::AppState;

use crate::config::Config;
use crate::constants::MAX_UPLOAD_BYTES;
use crate::error::{Error, Result};
use crate::inference::Classifier;
use crate::store::UploadStore;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use std::sync::Arc;
use tracing::info;

/// Build the application router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index_page).post(handlers::classify))
        .route("/uploads/{key}", get(handlers::serve_upload))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Run the HTTP server until Ctrl+C.
pub async fn serve(config: &Config, classifier: Arc<dyn Classifier>) -> Result<()> {
    let store = UploadStore::open(&config.server.upload_dir)?;
    let state = Arc::new(AppState {
        classifier,
        store,
        image_dir: config.server.image_dir.clone(),
    });

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Bind {
            addr: addr.clone(),
            source: e,
        })?;

    info!("Listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Serve { source: e })
}

/// Resolve when the process receives Ctrl+C.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
