//! # Audit Record
//!
//! One audit record per prospective policy sale: identity, ownership,
//! scheduling, recovery markers, and the opaque payload attached by
//! collaborating systems.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use audita_core::{Actor, AuditId, Cuil, Timestamp, UserId};
use audita_state::AuditStatus;

// ─── MediaRefs ───────────────────────────────────────────────────────

/// References to media attached to an audit. Opaque to the core — the
/// strings are storage keys owned by a collaborating system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRefs {
    /// Image attachments.
    #[serde(default)]
    pub images: Vec<String>,
    /// Optional video attachment.
    pub video: Option<String>,
    /// Optional audio attachment.
    pub audio: Option<String>,
}

// ─── Audit ───────────────────────────────────────────────────────────

/// A tracked sale/verification record for one prospective policy.
///
/// `scheduled_at` is a local wall-clock value and is never UTC-normalized;
/// every other instant is UTC bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    /// Internal record identifier.
    pub id: AuditId,
    /// External unique identity. Unique store-wide across all time.
    pub cuil: Cuil,
    /// Assigned agent.
    pub asesor: UserId,
    /// Actor who created the record.
    pub created_by: UserId,
    /// Optional back-office assignee.
    pub administrador: Option<UserId>,
    /// Team grouping; when absent it is inferred from the asesor's
    /// directory entry.
    pub numero_equipo: Option<u32>,
    /// Appointment time, local wall clock.
    pub scheduled_at: NaiveDateTime,
    /// Current status.
    pub status: AuditStatus,
    /// When the status last changed.
    pub status_updated_at: Timestamp,
    /// When the audit becomes eligible for the recovery pool. `Some`
    /// exactly while the status is in the recovery timer set.
    pub recovery_eligible_at: Option<Timestamp>,
    /// Manual override promoting the record into the recovery pool
    /// regardless of the timer.
    #[serde(default)]
    pub is_recovery: bool,
    /// When the record was moved into the recovery pool.
    pub recovery_moved_at: Option<Timestamp>,
    /// `"YYYY-MM"` month the record entered the pool.
    pub recovery_month: Option<String>,
    /// Soft-delete marker for recovery-pool removal. The record survives.
    pub recovery_deleted_at: Option<Timestamp>,
    /// Free-form notes from collaborating systems. Opaque.
    pub datos_extra: Option<serde_json::Value>,
    /// Attached media references. Opaque.
    #[serde(default)]
    pub media: MediaRefs,
    /// When the record was created.
    pub created_at: Timestamp,
}

// ─── NewAudit ────────────────────────────────────────────────────────

/// Input contract for creating an audit. The slot allocator validates it
/// and fills in everything derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAudit {
    /// External unique identity.
    pub cuil: Cuil,
    /// Assigned agent.
    pub asesor: UserId,
    /// Optional back-office assignee.
    pub administrador: Option<UserId>,
    /// Team grouping, when supplied directly.
    pub numero_equipo: Option<u32>,
    /// Requested appointment, local wall clock.
    pub scheduled_at: NaiveDateTime,
    /// Free-form notes.
    pub datos_extra: Option<serde_json::Value>,
    /// Attached media references.
    #[serde(default)]
    pub media: MediaRefs,
}

impl NewAudit {
    /// Materialize the record: initial status, creator taken from the
    /// acting caller, bookkeeping stamped at `now`.
    pub fn into_audit(self, actor: &Actor, now: Timestamp) -> Audit {
        Audit {
            id: AuditId::new(),
            cuil: self.cuil,
            asesor: self.asesor,
            created_by: actor.id.clone(),
            administrador: self.administrador,
            numero_equipo: self.numero_equipo,
            scheduled_at: self.scheduled_at,
            status: AuditStatus::INITIAL,
            status_updated_at: now,
            recovery_eligible_at: None,
            is_recovery: false,
            recovery_moved_at: None,
            recovery_month: None,
            recovery_deleted_at: None,
            datos_extra: self.datos_extra,
            media: self.media,
            created_at: now,
        }
    }
}

// ─── AuditPatch ──────────────────────────────────────────────────────

/// Partial update applied by the privileged edit operation. Absent fields
/// are left untouched; `status` is deliberately not editable here — status
/// writes go through the lifecycle engine so the recovery marker stays
/// consistent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPatch {
    /// Reassign the agent.
    pub asesor: Option<UserId>,
    /// Reassign the back-office assignee.
    pub administrador: Option<UserId>,
    /// Override the team grouping.
    pub numero_equipo: Option<u32>,
    /// Move the appointment.
    pub scheduled_at: Option<NaiveDateTime>,
    /// Replace the free-form notes.
    pub datos_extra: Option<serde_json::Value>,
    /// Replace the media references.
    pub media: Option<MediaRefs>,
}

impl AuditPatch {
    /// Apply every present field to `audit`.
    pub fn apply(self, audit: &mut Audit) {
        if let Some(asesor) = self.asesor {
            audit.asesor = asesor;
        }
        if let Some(administrador) = self.administrador {
            audit.administrador = Some(administrador);
        }
        if let Some(numero_equipo) = self.numero_equipo {
            audit.numero_equipo = Some(numero_equipo);
        }
        if let Some(scheduled_at) = self.scheduled_at {
            audit.scheduled_at = scheduled_at;
        }
        if let Some(datos_extra) = self.datos_extra {
            audit.datos_extra = Some(datos_extra);
        }
        if let Some(media) = self.media {
            audit.media = media;
        }
    }

    /// Whether the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.asesor.is_none()
            && self.administrador.is_none()
            && self.numero_equipo.is_none()
            && self.scheduled_at.is_none()
            && self.datos_extra.is_none()
            && self.media.is_none()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use audita_core::Role;
    use chrono::NaiveDate;

    fn sample_new_audit() -> NewAudit {
        NewAudit {
            cuil: Cuil::parse("20-11111111-1").unwrap(),
            asesor: UserId::new("asesor-1").unwrap(),
            administrador: None,
            numero_equipo: Some(7),
            scheduled_at: NaiveDate::from_ymd_opt(2026, 5, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            datos_extra: None,
            media: MediaRefs::default(),
        }
    }

    fn creator() -> Actor {
        Actor::new(UserId::new("creator-1").unwrap(), Role::Agent)
    }

    #[test]
    fn test_into_audit_sets_initial_status() {
        let now = Timestamp::parse("2026-04-30T09:00:00Z").unwrap();
        let audit = sample_new_audit().into_audit(&creator(), now);
        assert_eq!(audit.status, AuditStatus::Scheduled);
        assert_eq!(audit.status_updated_at, now);
        assert_eq!(audit.created_at, now);
        assert_eq!(audit.recovery_eligible_at, None);
        assert!(!audit.is_recovery);
    }

    #[test]
    fn test_into_audit_takes_creator_from_actor() {
        let now = Timestamp::now();
        let audit = sample_new_audit().into_audit(&creator(), now);
        assert_eq!(audit.created_by, UserId::new("creator-1").unwrap());
        assert_eq!(audit.asesor, UserId::new("asesor-1").unwrap());
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let now = Timestamp::now();
        let mut audit = sample_new_audit().into_audit(&creator(), now);
        let patch = AuditPatch {
            asesor: Some(UserId::new("asesor-2").unwrap()),
            ..Default::default()
        };
        patch.apply(&mut audit);
        assert_eq!(audit.asesor, UserId::new("asesor-2").unwrap());
        assert_eq!(audit.numero_equipo, Some(7));
    }

    #[test]
    fn test_empty_patch_is_empty() {
        assert!(AuditPatch::default().is_empty());
    }

    #[test]
    fn test_audit_serde_uses_camel_case() {
        let now = Timestamp::now();
        let audit = sample_new_audit().into_audit(&creator(), now);
        let json = serde_json::to_value(&audit).unwrap();
        assert!(json.get("createdBy").is_some());
        assert!(json.get("recoveryEligibleAt").is_some());
        assert!(json.get("numeroEquipo").is_some());
        assert!(json.get("datosExtra").is_some());
    }

    #[test]
    fn test_audit_serde_roundtrip() {
        let now = Timestamp::now();
        let audit = sample_new_audit().into_audit(&creator(), now);
        let json = serde_json::to_string(&audit).unwrap();
        let parsed: Audit = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, audit.id);
        assert_eq!(parsed.cuil, audit.cuil);
        assert_eq!(parsed.status, audit.status);
        assert_eq!(parsed.scheduled_at, audit.scheduled_at);
    }
}
