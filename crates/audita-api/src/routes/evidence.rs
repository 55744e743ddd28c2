//! # Evidence Routes
//!
//! Routes:
//! - POST  /evidence/upload — multipart upload (`ventaId` + `file` parts)
//! - PATCH /evidence/{auditId}/complete — finalize the package
//! - GET   /evidence/{auditId}/download — stream the file, role-gated
//!
//! All mutability rules live in the engine; these handlers only move
//! bytes between the multipart layer and the service.

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use uuid::Uuid;

use audita_core::{AuditId, Timestamp};
use audita_engine::EvidenceUpload;
use audita_store::EvidencePackage;

use crate::auth::ActorContext;
use crate::error::AppError;
use crate::state::AppState;

/// Evidence router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .route("/{audit_id}/complete", patch(complete))
        .route("/{audit_id}/download", get(download))
}

// ─── Upload ──────────────────────────────────────────────────────────

async fn upload(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<EvidencePackage>), AppError> {
    let mut venta_id: Option<AuditId> = None;
    let mut file: Option<EvidenceUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("ventaId") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                let uuid = raw
                    .parse::<Uuid>()
                    .map_err(|_| AppError::Validation(format!("invalid ventaId {raw:?}")))?;
                venta_id = Some(AuditId(uuid));
            }
            Some("file") => {
                let original_name = field
                    .file_name()
                    .unwrap_or("evidence.bin")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                file = Some(EvidenceUpload {
                    original_name,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let venta_id =
        venta_id.ok_or_else(|| AppError::Validation("missing ventaId field".to_string()))?;
    let file = file.ok_or_else(|| AppError::Validation("missing file field".to_string()))?;

    // Replacement answers 200, first upload 201.
    let replacing = state.store.get_evidence(venta_id).is_some();
    let package = state
        .evidence
        .upload(venta_id, file, &actor, Timestamp::now())?;
    let code = if replacing {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((code, Json(package)))
}

// ─── Completion ──────────────────────────────────────────────────────

async fn complete(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Path(audit_id): Path<Uuid>,
) -> Result<Json<EvidencePackage>, AppError> {
    let package = state.evidence.mark_complete(AuditId(audit_id), &actor)?;
    Ok(Json(package))
}

// ─── Download ────────────────────────────────────────────────────────

async fn download(
    State(state): State<AppState>,
    ActorContext(actor): ActorContext,
    Path(audit_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (package, bytes) = state.evidence.download(AuditId(audit_id), &actor)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    let disposition = format!(
        "attachment; filename=\"{}\"",
        package.original_name.replace('"', "")
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    let mut response = Response::new(Body::from(bytes));
    response.headers_mut().extend(headers);
    Ok(response)
}
