//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers in the Audita Stack.
//! These prevent accidental identifier confusion — you cannot pass a
//! `UserId` where an `AuditId` is expected.
//!
//! The `Cuil` newtype is the audit's external identity: the Argentine
//! tax-identification number. It is globally unique across the whole
//! audit store, independent of scheduling date.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

// ─── AuditId ─────────────────────────────────────────────────────────

/// Unique internal identifier for an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditId(pub Uuid);

impl AuditId {
    /// Generate a new random audit identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AuditId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AuditId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "audit:{}", self.0)
    }
}

// ─── UserId ──────────────────────────────────────────────────────────

/// Identifier of an actor (agent, team lead, back-office user, ...).
///
/// Issued by the external identity provider; opaque to this system
/// beyond equality comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap a provider-issued identifier. Rejects empty strings.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::EmptyIdentifier("UserId"));
        }
        Ok(Self(id))
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Cuil ────────────────────────────────────────────────────────────

/// Argentine tax-identification number (CUIL), the audit's external
/// unique identity.
///
/// Stored normalized as 11 ASCII digits. Input may carry the customary
/// hyphens (`20-11111111-1`); display always re-inserts them. The mod-11
/// check digit is deliberately not verified — the upstream system treats
/// the CUIL as an opaque unique key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cuil(String);

impl Cuil {
    /// Parse a CUIL, accepting hyphenated or bare-digit input.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCuil`] unless the input normalizes to
    /// exactly 11 digits.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let digits: String = input.chars().filter(|c| *c != '-').collect();
        if digits.len() != 11 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidCuil(input.to_string()));
        }
        Ok(Self(digits))
    }

    /// The normalized 11-digit form, no separators.
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cuil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Canonical XX-XXXXXXXX-X grouping.
        write!(f, "{}-{}-{}", &self.0[..2], &self.0[2..10], &self.0[10..])
    }
}

impl TryFrom<String> for Cuil {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Cuil::parse(&value)
    }
}

impl From<Cuil> for String {
    fn from(cuil: Cuil) -> Self {
        cuil.to_string()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
