//! # Actor & Role Types
//!
//! The authenticated caller as supplied by the external identity provider:
//! a role, an identity, an optional team number, and (for team leads) the
//! optional direct list of subordinate agent identities.
//!
//! Authorization decisions are **not** made here — the visibility filter
//! and the per-operation gates in `audita-engine` interpret these fields.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identity::UserId;

// ─── Role ────────────────────────────────────────────────────────────

/// The closed set of actor roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Sales agent (asesor). Sees only audits they created.
    Agent,
    /// Supervises a set of agents, scoped by direct relation or shared
    /// team number.
    TeamLead,
    /// Performs the verification call on scheduled audits.
    Auditor,
    /// Back-office operations over the full pipeline.
    Administrator,
    /// Handles documentation and evidence packages.
    BackOffice,
    /// Unrestricted oversight, including completed evidence downloads.
    Management,
    /// External reseller with read-only reporting access.
    Reseller,
    /// Human-resources reporting access.
    Hr,
}

impl Role {
    /// The canonical wire name of this role (kebab-case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::TeamLead => "team-lead",
            Self::Auditor => "auditor",
            Self::Administrator => "administrator",
            Self::BackOffice => "back-office",
            Self::Management => "management",
            Self::Reseller => "reseller",
            Self::Hr => "hr",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agent" => Ok(Self::Agent),
            "team-lead" => Ok(Self::TeamLead),
            "auditor" => Ok(Self::Auditor),
            "administrator" => Ok(Self::Administrator),
            "back-office" => Ok(Self::BackOffice),
            "management" => Ok(Self::Management),
            "reseller" => Ok(Self::Reseller),
            "hr" => Ok(Self::Hr),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

// ─── Actor ───────────────────────────────────────────────────────────

/// The authenticated caller on a request.
///
/// Constructed by the API layer from gateway-injected headers; the
/// identity provider is the source of truth for every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// The caller's own identity.
    pub id: UserId,
    /// The caller's role.
    pub role: Role,
    /// Team number, when the caller belongs to a team.
    pub team_number: Option<u32>,
    /// Direct-report agent identities (team-lead → agents relation).
    /// Empty for every other role.
    #[serde(default)]
    pub subordinates: Vec<UserId>,
}

impl Actor {
    /// A minimal actor with no team affiliation.
    pub fn new(id: UserId, role: Role) -> Self {
        Self {
            id,
            role,
            team_number: None,
            subordinates: Vec::new(),
        }
    }

    /// Whether `user` appears in the caller's direct-report list.
    pub fn supervises(&self, user: &UserId) -> bool {
        self.subordinates.contains(user)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
