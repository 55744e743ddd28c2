//! # Recovery Pool Routes
//!
//! Routes:
//! - GET    /recovery — the pool: timer-elapsed ∪ manually-flagged
//! - POST   /recovery — create a pool record directly
//! - POST   /recovery/{id}/flag — flag an existing audit into the pool
//! - DELETE /recovery/{id} — soft-remove a record from the pool
//!
//! Eligibility is evaluated lazily against request time; nothing here is
//! scheduled.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::Local;
use uuid::Uuid;

use audita_core::{AuditId, Timestamp};
use audita_engine::{NewRecoveryEntry, PoolEntry};
use audita_store::Audit;

use crate::auth::ActorContext;
use crate::error::AppError;
use crate::state::AppState;

/// Recovery router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}/flag", axum::routing::post(flag))
        .route("/{id}", delete(remove))
}

async fn list(
    State(state): State<AppState>,
    ActorContext(_actor): ActorContext,
) -> Json<Vec<PoolEntry>> {
    Json(state.lifecycle.list_recovery_pool(Timestamp::now()))
}

async fn create(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Json(input): Json<NewRecoveryEntry>,
) -> Result<(StatusCode, Json<Audit>), AppError> {
    let audit = state.lifecycle.create_recovery_entry(
        input,
        &actor,
        Timestamp::now(),
        Local::now().naive_local(),
    )?;
    Ok((StatusCode::CREATED, Json(audit)))
}

async fn flag(
    State(state): State<AppState>,
    ActorContext(_actor): ActorContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Audit>, AppError> {
    let audit = state
        .lifecycle
        .flag_for_recovery(AuditId(id), Timestamp::now())?;
    Ok(Json(audit))
}

async fn remove(
    State(state): State<AppState>,
    ActorContext(_actor): ActorContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Audit>, AppError> {
    let audit = state
        .lifecycle
        .remove_from_pool(AuditId(id), Timestamp::now())?;
    Ok(Json(audit))
}
