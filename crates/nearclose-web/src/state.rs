use std::sync::Arc;

use nearclose_core::LookupService;

/// Shared application state, passed to all route handlers via `axum::extract::State`.
///
/// Read-only after startup; each request builds its own lookup.
pub struct AppState {
    pub service: LookupService,
}

impl AppState {
    pub fn new(service: LookupService) -> Arc<Self> {
        Arc::new(Self { service })
    }
}
