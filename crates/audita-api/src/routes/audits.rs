//! # Audit Routes
//!
//! Routes:
//! - POST   /audits — create (slot allocator gate)
//! - GET    /audits — scoped listing with optional filters
//! - GET    /audits/range — scoped listing over a mandatory date range
//! - GET    /audits/export — scoped export (no recovery exclusion)
//! - GET    /audits/available-slots — booking counts per 20-minute window
//! - PATCH  /audits/{id}/status — status change via the lifecycle engine
//! - PATCH  /audits/{id} — privileged partial edit
//! - DELETE /audits/{id} — delete, team-scoped for team leads
//!
//! Every read path consumes the same visibility scope built once per
//! request; the paths differ only in filters and recovery exclusion.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use uuid::Uuid;

use audita_core::{AuditId, Timestamp};
use audita_state::AuditStatus;
use audita_store::{Audit, AuditPatch, NewAudit};
use audita_engine::{
    excludes_recovery, is_recovery_suppressed, AvailableSlot, EnrichedAudit, VisibilityScope,
};

use crate::auth::ActorContext;
use crate::error::AppError;
use crate::state::AppState;

/// Audits router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/range", get(range))
        .route("/export", get(export))
        .route("/available-slots", get(available_slots))
        .route("/{id}/status", patch(set_status))
        .route("/{id}", patch(edit).delete(delete_audit))
}

// ─── Create ──────────────────────────────────────────────────────────

async fn create(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Json(input): Json<NewAudit>,
) -> Result<(StatusCode, Json<Audit>), AppError> {
    let today = Local::now().date_naive();
    let audit = state
        .allocator
        .create_audit(input, &actor, today, Timestamp::now())?;
    Ok((StatusCode::CREATED, Json(audit)))
}

// ─── Listings ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    date: Option<NaiveDate>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    status: Option<String>,
    asesor: Option<String>,
}

impl ListQuery {
    fn status_filter(&self) -> Result<Option<AuditStatus>, AppError> {
        self.status
            .as_deref()
            .map(|s| s.parse::<AuditStatus>())
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))
    }

    fn matches(&self, audit: &Audit, status: Option<AuditStatus>) -> bool {
        let date = audit.scheduled_at.date();
        self.date.map_or(true, |d| date == d)
            && self.date_from.map_or(true, |d| date >= d)
            && self.date_to.map_or(true, |d| date <= d)
            && status.map_or(true, |s| audit.status == s)
            && self
                .asesor
                .as_deref()
                .map_or(true, |a| audit.asesor.as_str() == a)
    }
}

fn scoped_listing(
    state: &AppState,
    actor: &audita_core::Actor,
    query: &ListQuery,
    apply_recovery_exclusion: bool,
) -> Result<Vec<EnrichedAudit>, AppError> {
    let status = query.status_filter()?;
    let now = Timestamp::now();
    let scope = VisibilityScope::for_actor(actor);
    let exclude = apply_recovery_exclusion && excludes_recovery(actor.role);

    let mut audits = state.store.find_audits(|audit| {
        scope.matches(audit, &state.directory)
            && !(exclude && is_recovery_suppressed(audit, now))
            && query.matches(audit, status)
    });
    audits.sort_by_key(|a| a.scheduled_at);
    Ok(audits
        .into_iter()
        .map(|a| EnrichedAudit::from_audit(a, &state.directory))
        .collect())
}

async fn list(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<EnrichedAudit>>, AppError> {
    Ok(Json(scoped_listing(&state, &actor, &query, true)?))
}

async fn range(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<EnrichedAudit>>, AppError> {
    if query.date_from.is_none() || query.date_to.is_none() {
        return Err(AppError::Validation(
            "dateFrom and dateTo are required".to_string(),
        ));
    }
    Ok(Json(scoped_listing(&state, &actor, &query, true)?))
}

async fn export(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<EnrichedAudit>>, AppError> {
    // Exports carry the full scope, recovery-eligible records included.
    Ok(Json(scoped_listing(&state, &actor, &query, false)?))
}

// ─── Available slots ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SlotsQuery {
    date: Option<NaiveDate>,
}

async fn available_slots(
    State(state): State<AppState>,
    ActorContext(_actor): ActorContext,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Vec<AvailableSlot>>, AppError> {
    let date = query
        .date
        .ok_or_else(|| AppError::Validation("date is required".to_string()))?;
    Ok(Json(state.allocator.list_available_slots(date)))
}

// ─── Status change ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StatusChange {
    status: String,
}

async fn set_status(
    State(state): State<AppState>,
    ActorContext(_actor): ActorContext,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusChange>,
) -> Result<Json<Audit>, AppError> {
    let status: AuditStatus = body
        .status
        .parse()
        .map_err(|e: audita_state::StatusError| AppError::Validation(e.to_string()))?;
    let audit = state
        .lifecycle
        .set_status(AuditId(id), status, Timestamp::now())?;
    Ok(Json(audit))
}

// ─── Privileged edit & delete ────────────────────────────────────────

async fn edit(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Path(id): Path<Uuid>,
    Json(patch): Json<AuditPatch>,
) -> Result<Json<Audit>, AppError> {
    let audit = state.lifecycle.edit_audit(AuditId(id), patch, &actor)?;
    Ok(Json(audit))
}

async fn delete_audit(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Audit>, AppError> {
    let removed = state
        .lifecycle
        .delete_audit(AuditId(id), &actor, &state.directory)?;
    Ok(Json(removed))
}
