//! # Health Probes
//!
//! Liveness and readiness endpoints. No actor context required.

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health/live", get(|| async { "ok" }))
        .route("/health/ready", get(|| async { "ok" }))
}
