//! # Lifecycle & Recovery Engine
//!
//! Applies status changes and derives recovery eligibility as a pure
//! function of the new status. Also owns the recovery pool: the
//! timer/manual dual trigger, direct pool creation, soft deletion, and
//! the privileged edit/delete operations on audit records.
//!
//! There is no transition graph — any permitted caller may set any status
//! value. What the engine guarantees is the marker invariant: after every
//! status write, `recovery_eligible_at` is `Some(now + 24h)` exactly when
//! the new status arms the timer, `None` otherwise.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use audita_core::{Actor, Cuil, AuditId, Role, Timestamp, UserId};
use audita_state::{recovery_eligible_after, AuditStatus};
use audita_store::{Audit, AuditPatch, MediaRefs, MemoryStore, NewAudit, StoreError};

use crate::notify::AuditNotifier;
use crate::visibility::{TeamDirectory, VisibilityScope};

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by lifecycle operations.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Underlying store rejection (unknown id, duplicate CUIL backstop).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A required field is absent from a direct recovery-entry creation.
    #[error("missing required field {0:?}")]
    MissingField(&'static str),

    /// The actor's role may not perform this operation.
    #[error("role {role} may not {action}")]
    ForbiddenRole {
        /// The rejected role.
        role: Role,
        /// The attempted action.
        action: &'static str,
    },

    /// A team lead attempted to delete an audit outside their scope.
    #[error("audit {0} is outside the team lead's scope")]
    OutsideScope(AuditId),
}

// ─── Recovery pool types ─────────────────────────────────────────────

/// Why an audit is in the recovery pool. The two triggers are
/// independent; when both hold, the manual flag wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolReason {
    /// Operator flagged the record directly.
    Manual,
    /// The status stalled and the 24-hour timer elapsed.
    Timer,
}

/// One recovery-pool entry: the audit plus the reason it qualified.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolEntry {
    /// The qualifying audit.
    #[serde(flatten)]
    pub audit: Audit,
    /// Which trigger put it in the pool.
    pub pool_reason: PoolReason,
}

/// Input contract for creating a recovery-pool record directly, without
/// going through the booking flow. Only `cuil` and `asesor` are required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecoveryEntry {
    /// External unique identity. Required.
    pub cuil: Option<Cuil>,
    /// Assigned agent. Required.
    pub asesor: Option<UserId>,
    /// Optional back-office assignee.
    pub administrador: Option<UserId>,
    /// Team grouping, when supplied directly.
    pub numero_equipo: Option<u32>,
    /// Original appointment, when known.
    pub scheduled_at: Option<NaiveDateTime>,
    /// Free-form notes.
    pub datos_extra: Option<serde_json::Value>,
}

// ─── LifecycleEngine ─────────────────────────────────────────────────

/// Status writes, recovery triggers, and the privileged record
/// operations, over the shared store.
pub struct LifecycleEngine {
    store: Arc<MemoryStore>,
    notifier: Arc<dyn AuditNotifier>,
}

impl LifecycleEngine {
    /// Build the engine over a store and a notifier.
    pub fn new(store: Arc<MemoryStore>, notifier: Arc<dyn AuditNotifier>) -> Self {
        Self { store, notifier }
    }

    // ── Status writes ────────────────────────────────────────────────

    /// Apply a status change and derive the recovery-eligibility marker.
    ///
    /// Writes `status` and `status_updated_at`, overwrites
    /// `recovery_eligible_at` with the value the new status implies, and
    /// announces the update.
    pub fn set_status(
        &self,
        id: AuditId,
        new_status: AuditStatus,
        now: Timestamp,
    ) -> Result<Audit, LifecycleError> {
        let updated = self.store.update_audit(id, |audit| {
            audit.status = new_status;
            audit.status_updated_at = now;
            audit.recovery_eligible_at = recovery_eligible_after(new_status, now);
        })?;
        tracing::info!(audit = %id, status = %new_status, "status changed");
        self.notifier.audit_updated(&updated);
        Ok(updated)
    }

    /// Promote an audit into the recovery pool immediately, regardless of
    /// its status or the timer.
    pub fn flag_for_recovery(&self, id: AuditId, now: Timestamp) -> Result<Audit, LifecycleError> {
        let updated = self.store.update_audit(id, |audit| {
            audit.is_recovery = true;
            audit.recovery_eligible_at = Some(now);
            audit.recovery_moved_at = Some(now);
            audit.recovery_month = Some(now.month_key());
            audit.recovery_deleted_at = None;
        })?;
        tracing::info!(audit = %id, "flagged for recovery");
        self.notifier.audit_updated(&updated);
        Ok(updated)
    }

    // ── Recovery pool ────────────────────────────────────────────────

    /// The pool membership of one audit at `now`, if any.
    ///
    /// Soft-deleted entries never qualify. Manual flagging wins over the
    /// timer when both triggers hold.
    pub fn pool_reason(audit: &Audit, now: Timestamp) -> Option<PoolReason> {
        if audit.recovery_deleted_at.is_some() {
            return None;
        }
        if audit.is_recovery {
            return Some(PoolReason::Manual);
        }
        let timer_elapsed = audit.status.triggers_recovery_timer()
            && audit.recovery_eligible_at.is_some_and(|at| at <= now);
        timer_elapsed.then_some(PoolReason::Timer)
    }

    /// Every audit currently in the recovery pool: the union of
    /// timer-elapsed and manually-flagged records, each tagged with its
    /// reason, soft-deleted entries excluded.
    pub fn list_recovery_pool(&self, now: Timestamp) -> Vec<PoolEntry> {
        self.store
            .find_audits(|audit| Self::pool_reason(audit, now).is_some())
            .into_iter()
            .filter_map(|audit| {
                Self::pool_reason(&audit, now).map(|pool_reason| PoolEntry { audit, pool_reason })
            })
            .collect()
    }

    /// Create a recovery-pool record directly: the audit is born flagged,
    /// bypassing the booking flow entirely (no slot capacity applies).
    /// The CUIL uniqueness backstop still holds.
    pub fn create_recovery_entry(
        &self,
        input: NewRecoveryEntry,
        actor: &Actor,
        now: Timestamp,
        now_local: NaiveDateTime,
    ) -> Result<Audit, LifecycleError> {
        let cuil = input.cuil.ok_or(LifecycleError::MissingField("cuil"))?;
        let asesor = input.asesor.ok_or(LifecycleError::MissingField("asesor"))?;

        let new_audit = NewAudit {
            cuil,
            asesor,
            administrador: input.administrador,
            numero_equipo: input.numero_equipo,
            scheduled_at: input.scheduled_at.unwrap_or(now_local),
            datos_extra: input.datos_extra,
            media: MediaRefs::default(),
        };
        let mut audit = new_audit.into_audit(actor, now);
        audit.is_recovery = true;
        audit.recovery_eligible_at = Some(now);
        audit.recovery_moved_at = Some(now);
        audit.recovery_month = Some(now.month_key());

        let inserted = self.store.insert_audit(audit)?;
        tracing::info!(audit = %inserted.id, cuil = %inserted.cuil, "recovery entry created");
        self.notifier.audit_updated(&inserted);
        Ok(inserted)
    }

    /// Soft-delete an audit from the recovery pool. The record survives;
    /// it simply stops qualifying for the pool query.
    pub fn remove_from_pool(&self, id: AuditId, now: Timestamp) -> Result<Audit, LifecycleError> {
        let updated = self.store.update_audit(id, |audit| {
            audit.recovery_deleted_at = Some(now);
        })?;
        tracing::info!(audit = %id, "removed from recovery pool");
        Ok(updated)
    }

    // ── Privileged record operations ─────────────────────────────────

    /// Apply a partial edit to an audit. Back-office tier only.
    pub fn edit_audit(
        &self,
        id: AuditId,
        patch: AuditPatch,
        actor: &Actor,
    ) -> Result<Audit, LifecycleError> {
        if !matches!(
            actor.role,
            Role::Administrator | Role::BackOffice | Role::Management
        ) {
            return Err(LifecycleError::ForbiddenRole {
                role: actor.role,
                action: "edit audits",
            });
        }
        let updated = self.store.update_audit(id, |audit| patch.apply(audit))?;
        tracing::info!(audit = %id, editor = %actor.id, "audit edited");
        self.notifier.audit_updated(&updated);
        Ok(updated)
    }

    /// Delete an audit record outright.
    ///
    /// Administrators and management may delete anything. A team lead may
    /// delete only audits inside their visibility scope (own team, direct
    /// reports, or records they created). Everyone else is rejected.
    pub fn delete_audit(
        &self,
        id: AuditId,
        actor: &Actor,
        directory: &TeamDirectory,
    ) -> Result<Audit, LifecycleError> {
        match actor.role {
            Role::Administrator | Role::Management => {}
            Role::TeamLead => {
                let audit = self.store.get_audit(id)?;
                let scope = VisibilityScope::for_actor(actor);
                if !scope.matches(&audit, directory) {
                    return Err(LifecycleError::OutsideScope(id));
                }
            }
            role => {
                return Err(LifecycleError::ForbiddenRole {
                    role,
                    action: "delete audits",
                });
            }
        }
        let removed = self.store.remove_audit(id)?;
        tracing::info!(audit = %id, deleted_by = %actor.id, "audit deleted");
        Ok(removed)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
