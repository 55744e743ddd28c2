//! # audita-api — Axum API Surface
//!
//! The HTTP layer of the Audita Stack, built on Axum/Tower/Tokio.
//! Assembles the route modules into a single application with shared
//! middleware for tracing and CORS.
//!
//! ## Routers
//!
//! - `/audits/*` — booking, scoped listings, status changes, privileged
//!   edit/delete, available slots.
//! - `/recovery/*` — the recovery pool: listing, direct creation, soft
//!   removal.
//! - `/evidence/*` — evidence package upload, completion, download.
//! - `/health/*` — liveness/readiness probes (no actor context required).
//!
//! ## Actor context
//!
//! Authentication and session mechanics live outside this system. The
//! gateway injects the authenticated actor on every request via the
//! `x-actor-id` / `x-actor-role` / `x-team-number` / `x-subordinates`
//! headers; the extractor in `auth.rs` turns them into an `Actor` and
//! rejects requests missing the mandatory pair.
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers — everything delegates to
//!   `audita-engine`.
//! - All errors map to structured HTTP responses via `AppError`.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::AppState;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assemble the full application router over shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/audits", routes::audits::router())
        .nest("/recovery", routes::recovery::router())
        .nest("/evidence", routes::evidence::router())
        .merge(routes::health::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
