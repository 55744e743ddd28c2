//! # Application Error
//!
//! Maps domain errors to structured HTTP responses. The taxonomy:
//! validation and precondition conflicts are 400, authorization concerns
//! (including locked-resource mutation) are 403, unresolved references
//! are 404, and unexpected store/storage failures are 500. Nothing is
//! retried here and nothing is swallowed — every rejection reaches the
//! caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use audita_engine::{EvidenceError, LifecycleError, SchedulingError};
use audita_store::StoreError;

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Precondition conflict: duplicate identity, full slot.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Actor context missing or unparseable.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions, or mutation of a locked resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // Precondition conflicts surface as plain client errors.
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::InvalidDate(_) => Self::Validation(err.to_string()),
            SchedulingError::DuplicateIdentity(_) | SchedulingError::SlotFull(_) => {
                Self::Conflict(err.to_string())
            }
            SchedulingError::Store(inner) => Self::Internal(inner.to_string()),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Store(StoreError::AuditNotFound(_)) => Self::NotFound(err.to_string()),
            LifecycleError::Store(StoreError::DuplicateCuil(_)) => Self::Conflict(err.to_string()),
            LifecycleError::Store(inner) => Self::Internal(inner.to_string()),
            LifecycleError::MissingField(_) => Self::Validation(err.to_string()),
            LifecycleError::ForbiddenRole { .. } | LifecycleError::OutsideScope(_) => {
                Self::Forbidden(err.to_string())
            }
        }
    }
}

impl From<EvidenceError> for AppError {
    fn from(err: EvidenceError) -> Self {
        match err {
            EvidenceError::AuditNotFound(_)
            | EvidenceError::PackageNotFound(_)
            | EvidenceError::FileMissing(_) => Self::NotFound(err.to_string()),
            EvidenceError::NotEligible { .. }
            | EvidenceError::NoFile(_)
            | EvidenceError::WrongAuditState { .. } => Self::Validation(err.to_string()),
            EvidenceError::Locked(_) | EvidenceError::ForbiddenRole { .. } => {
                Self::Forbidden(err.to_string())
            }
            EvidenceError::Storage(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audita_core::AuditId;

    #[test]
    fn test_status_code_mapping() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_locked_evidence_maps_to_forbidden() {
        let err: AppError = EvidenceError::Locked(AuditId::new()).into();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_unknown_audit_maps_to_not_found() {
        let id = AuditId::new();
        let err: AppError = LifecycleError::Store(StoreError::AuditNotFound(id)).into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
