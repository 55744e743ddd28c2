//! # Actor Extraction
//!
//! The external identity provider authenticates every request; the
//! gateway forwards the result as headers. This extractor rebuilds the
//! `Actor` from them:
//!
//! - `x-actor-id` — the caller's identity (required)
//! - `x-actor-role` — one of the eight role names (required)
//! - `x-team-number` — the caller's team, when assigned
//! - `x-subordinates` — comma-separated direct-report identities
//!
//! Requests missing or mangling the mandatory pair are rejected with 401
//! before any handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use audita_core::{Actor, Role, UserId};

use crate::error::AppError;

/// The authenticated caller, extracted from gateway headers.
#[derive(Debug, Clone)]
pub struct ActorContext(pub Actor);

impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = required_header(parts, "x-actor-id")?;
        let id = UserId::new(id).map_err(|e| AppError::Unauthorized(e.to_string()))?;

        let role = required_header(parts, "x-actor-role")?;
        let role: Role = role
            .parse()
            .map_err(|_| AppError::Unauthorized(format!("unknown role {role:?}")))?;

        let team_number = match optional_header(parts, "x-team-number")? {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
                AppError::Unauthorized(format!("invalid x-team-number {raw:?}"))
            })?),
            None => None,
        };

        let subordinates = match optional_header(parts, "x-subordinates")? {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(UserId::new)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| AppError::Unauthorized(e.to_string()))?,
            None => Vec::new(),
        };

        Ok(Self(Actor {
            id,
            role,
            team_number,
            subordinates,
        }))
    }
}

fn required_header(parts: &Parts, name: &str) -> Result<String, AppError> {
    optional_header(parts, name)?
        .ok_or_else(|| AppError::Unauthorized(format!("missing {name} header")))
}

fn optional_header(parts: &Parts, name: &str) -> Result<Option<String>, AppError> {
    match parts.headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|s| Some(s.to_string()))
            .map_err(|_| AppError::Unauthorized(format!("invalid {name} header"))),
    }
}
