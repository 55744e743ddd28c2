//! # Visibility Filter
//!
//! Builds the predicate that scopes which audit records an actor may
//! read, and decides whether recovery-eligible records are suppressed
//! from their default listing.
//!
//! The predicate is built **once per request** and consumed by every read
//! path — default listing, date-range listing, export — so team-membership
//! rules cannot drift between endpoints.
//!
//! ## Team resolution fallback
//!
//! A team lead's scope includes agents reached by either of two routes:
//! the explicit direct-report edge, or a matching team number. When an
//! asesor has no directory entry, the team number is taken from the audit
//! record itself. The enrichment step that attaches team-lead display
//! information uses the same fallback, deliberately in this one place.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;

use audita_core::{Actor, Role, Timestamp, UserId};
use audita_store::Audit;

// ─── TeamDirectory ───────────────────────────────────────────────────

/// Directory entry for one agent.
#[derive(Debug, Clone)]
pub struct AgentEntry {
    /// Human-readable name for listings.
    pub display_name: String,
    /// The agent's team number.
    pub team_number: Option<u32>,
    /// Direct-report edge to the agent's team lead.
    pub team_lead: Option<UserId>,
}

#[derive(Debug, Default)]
struct DirectoryInner {
    agents: HashMap<UserId, AgentEntry>,
    leads_by_team: HashMap<u32, UserId>,
}

/// In-process mirror of the identity provider's agent/team data.
///
/// Consulted by the visibility predicate (team-membership route) and by
/// listing enrichment (team-lead display info).
#[derive(Debug, Default)]
pub struct TeamDirectory {
    inner: RwLock<DirectoryInner>,
}

impl TeamDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an agent's entry.
    pub fn upsert_agent(&self, id: UserId, entry: AgentEntry) {
        self.write().agents.insert(id, entry);
    }

    /// Register the lead for a team number.
    pub fn set_team_lead(&self, team_number: u32, lead: UserId) {
        self.write().leads_by_team.insert(team_number, lead);
    }

    /// The team number of an agent, when the directory knows them.
    pub fn team_number_of(&self, id: &UserId) -> Option<u32> {
        self.read().agents.get(id).and_then(|e| e.team_number)
    }

    /// The display name of a user, when the directory knows them.
    pub fn display_name_of(&self, id: &UserId) -> Option<String> {
        self.read().agents.get(id).map(|e| e.display_name.clone())
    }

    /// Resolve the team lead for an asesor: direct-report edge first,
    /// then the team-number fallback (`fallback_team` is the audit's own
    /// grouping, used when the asesor has no directory entry).
    pub fn lead_of(&self, asesor: &UserId, fallback_team: Option<u32>) -> Option<UserId> {
        let inner = self.read();
        if let Some(lead) = inner.agents.get(asesor).and_then(|e| e.team_lead.clone()) {
            return Some(lead);
        }
        let team = inner
            .agents
            .get(asesor)
            .and_then(|e| e.team_number)
            .or(fallback_team)?;
        inner.leads_by_team.get(&team).cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, DirectoryInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, DirectoryInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

// ─── VisibilityScope ─────────────────────────────────────────────────

/// The ownership predicate for one actor's reads.
#[derive(Debug, Clone)]
pub enum VisibilityScope {
    /// Matches every audit. Administrators, management, and the
    /// read-only reporting roles.
    Unrestricted,
    /// Matches the team lead's own records plus their team's, by either
    /// membership route.
    TeamLead {
        /// The lead's own identity.
        lead: UserId,
        /// The lead's team number, when assigned.
        team_number: Option<u32>,
        /// Explicit direct-report identities.
        subordinates: Vec<UserId>,
    },
    /// Matches only audits the actor created.
    Creator(UserId),
}

impl VisibilityScope {
    /// Build the scope for an actor.
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            Role::Agent => Self::Creator(actor.id.clone()),
            Role::TeamLead => Self::TeamLead {
                lead: actor.id.clone(),
                team_number: actor.team_number,
                subordinates: actor.subordinates.clone(),
            },
            Role::Administrator
            | Role::Management
            | Role::Auditor
            | Role::BackOffice
            | Role::Reseller
            | Role::Hr => Self::Unrestricted,
        }
    }

    /// Whether `audit` is inside this scope.
    ///
    /// The two team-membership routes (direct-report edge, team-number
    /// match) are a union — an audit satisfying either is included.
    pub fn matches(&self, audit: &Audit, directory: &TeamDirectory) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Creator(id) => audit.created_by == *id,
            Self::TeamLead {
                lead,
                team_number,
                subordinates,
            } => {
                if audit.asesor == *lead || audit.created_by == *lead {
                    return true;
                }
                if subordinates.contains(&audit.asesor) {
                    return true;
                }
                let audit_team = directory
                    .team_number_of(&audit.asesor)
                    .or(audit.numero_equipo);
                matches!((audit_team, team_number), (Some(a), Some(b)) if a == *b)
            }
        }
    }
}

// ─── Recovery exclusion ──────────────────────────────────────────────

/// Whether this role's default listing hides recovery-eligible records.
///
/// Team leads are the one exception: they see recovery-eligible audits
/// inline, since they are expected to resolve stalled items before the
/// pool picks them up.
pub fn excludes_recovery(role: Role) -> bool {
    role != Role::TeamLead
}

/// Whether an audit is suppressed from recovery-excluding listings at
/// `now`: the timer has elapsed on a recoverable status, or the manual
/// flag is set.
pub fn is_recovery_suppressed(audit: &Audit, now: Timestamp) -> bool {
    let timer_elapsed = audit.status.triggers_recovery_timer()
        && audit.recovery_eligible_at.is_some_and(|at| at <= now);
    timer_elapsed || audit.is_recovery
}

// ─── Enrichment ──────────────────────────────────────────────────────

/// A listed audit with team-lead display information attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedAudit {
    /// The audit record.
    #[serde(flatten)]
    pub audit: Audit,
    /// The asesor's team lead, when resolvable.
    pub team_lead_id: Option<UserId>,
    /// The team lead's display name, when the directory knows them.
    pub team_lead_name: Option<String>,
}

impl EnrichedAudit {
    /// Attach team-lead info, resolving through the directory with the
    /// same team-number fallback the predicate uses.
    pub fn from_audit(audit: Audit, directory: &TeamDirectory) -> Self {
        let lead = directory.lead_of(&audit.asesor, audit.numero_equipo);
        let team_lead_name = lead.as_ref().and_then(|l| directory.display_name_of(l));
        Self {
            audit,
            team_lead_id: lead,
            team_lead_name,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
