//! # Nearclose Web
//!
//! A single-form web front end for price-proximity lookups, plus a JSON
//! endpoint and the spreadsheet download.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Lookup form |
//! | `POST /check` | Run a lookup, render tables and notices |
//! | `GET /export?ticker=&as_of=` | Raw history as a spreadsheet attachment |
//! | `GET /api/check?ticker=&target_price=` | Lookup report as JSON |
//! | `GET /health` | Liveness and configured source |

pub mod error;
pub mod render;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use error::WebError;
pub use state::AppState;

/// Router with request tracing applied.
pub fn router(state: Arc<AppState>) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl+C.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("nearclose listening on http://{addr}");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received, stopping"),
        Err(error) => {
            tracing::warn!(%error, "could not listen for Ctrl+C; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
