//! # MemoryStore — In-Process Keyed Store
//!
//! A `RwLock`-guarded collection of audit records and their evidence
//! packages. Single-record updates run as a closure under the write lock,
//! which is the store's one atomic primitive.
//!
//! The unique CUIL index is the duplicate-identity backstop: the slot
//! allocator pre-checks uniqueness, but two concurrent creates can both
//! pass that read — the second insert then fails here instead of
//! producing a duplicate.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::RwLock;

use chrono::NaiveDateTime;
use thiserror::Error;

use audita_core::{AuditId, Cuil};

use crate::audit::Audit;
use crate::evidence::EvidencePackage;

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by store primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The audit id does not resolve.
    #[error("audit {0} not found")]
    AuditNotFound(AuditId),

    /// An audit with this CUIL already exists (unique-index backstop).
    #[error("an audit already exists for CUIL {0}")]
    DuplicateCuil(Cuil),

    /// No evidence package exists for this audit.
    #[error("no evidence package for audit {0}")]
    EvidenceNotFound(AuditId),
}

// ─── MemoryStore ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Inner {
    audits: HashMap<AuditId, Audit>,
    by_cuil: HashMap<Cuil, AuditId>,
    evidence: HashMap<AuditId, EvidencePackage>,
}

/// In-process store for audit records and evidence packages.
///
/// Clone-on-read: every accessor returns owned copies so callers never
/// hold the lock across their own logic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Audit primitives ─────────────────────────────────────────────

    /// Insert a new audit. Fails if the CUIL is already indexed.
    pub fn insert_audit(&self, audit: Audit) -> Result<Audit, StoreError> {
        let mut inner = self.write();
        if inner.by_cuil.contains_key(&audit.cuil) {
            return Err(StoreError::DuplicateCuil(audit.cuil));
        }
        inner.by_cuil.insert(audit.cuil.clone(), audit.id);
        inner.audits.insert(audit.id, audit.clone());
        Ok(audit)
    }

    /// Fetch one audit by id.
    pub fn get_audit(&self, id: AuditId) -> Result<Audit, StoreError> {
        self.read()
            .audits
            .get(&id)
            .cloned()
            .ok_or(StoreError::AuditNotFound(id))
    }

    /// Atomically mutate one audit under the write lock and return the
    /// updated record. The store's single-document update primitive.
    pub fn update_audit(
        &self,
        id: AuditId,
        mutate: impl FnOnce(&mut Audit),
    ) -> Result<Audit, StoreError> {
        let mut inner = self.write();
        let audit = inner
            .audits
            .get_mut(&id)
            .ok_or(StoreError::AuditNotFound(id))?;
        mutate(audit);
        Ok(audit.clone())
    }

    /// Remove an audit, its CUIL index entry, and any evidence package.
    pub fn remove_audit(&self, id: AuditId) -> Result<Audit, StoreError> {
        let mut inner = self.write();
        let audit = inner
            .audits
            .remove(&id)
            .ok_or(StoreError::AuditNotFound(id))?;
        inner.by_cuil.remove(&audit.cuil);
        inner.evidence.remove(&id);
        Ok(audit)
    }

    /// Whether any audit, regardless of date, holds this CUIL.
    pub fn contains_cuil(&self, cuil: &Cuil) -> bool {
        self.read().by_cuil.contains_key(cuil)
    }

    /// All audits matching `predicate`, in unspecified order.
    pub fn find_audits(&self, predicate: impl Fn(&Audit) -> bool) -> Vec<Audit> {
        self.read()
            .audits
            .values()
            .filter(|a| predicate(a))
            .cloned()
            .collect()
    }

    /// Count of audits whose appointment falls in the half-open local
    /// wall-clock `window`.
    pub fn count_scheduled_in(&self, window: Range<NaiveDateTime>) -> usize {
        self.read()
            .audits
            .values()
            .filter(|a| window.contains(&a.scheduled_at))
            .count()
    }

    // ── Evidence primitives ──────────────────────────────────────────

    /// Fetch the evidence package for an audit, if one exists.
    pub fn get_evidence(&self, venta_id: AuditId) -> Option<EvidencePackage> {
        self.read().evidence.get(&venta_id).cloned()
    }

    /// Insert or replace the evidence package for an audit. The map key
    /// is the audit id, which enforces the 1:1 relation.
    pub fn put_evidence(&self, package: EvidencePackage) -> EvidencePackage {
        let mut inner = self.write();
        inner.evidence.insert(package.venta_id, package.clone());
        package
    }

    /// Atomically mutate the evidence package for an audit.
    pub fn update_evidence(
        &self,
        venta_id: AuditId,
        mutate: impl FnOnce(&mut EvidencePackage),
    ) -> Result<EvidencePackage, StoreError> {
        let mut inner = self.write();
        let package = inner
            .evidence
            .get_mut(&venta_id)
            .ok_or(StoreError::EvidenceNotFound(venta_id))?;
        mutate(package);
        Ok(package.clone())
    }

    // ── Lock plumbing ────────────────────────────────────────────────

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        // A poisoned lock only means another thread panicked mid-write;
        // the data is still the last consistent map state.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use audita_core::{Actor, Role, Timestamp, UserId};
    use audita_state::{AuditStatus, EvidenceState};
    use chrono::NaiveDate;

    use crate::audit::{MediaRefs, NewAudit};

    fn make_audit(cuil: &str) -> Audit {
        let input = NewAudit {
            cuil: Cuil::parse(cuil).unwrap(),
            asesor: UserId::new("asesor-1").unwrap(),
            administrador: None,
            numero_equipo: None,
            scheduled_at: NaiveDate::from_ymd_opt(2026, 5, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            datos_extra: None,
            media: MediaRefs::default(),
        };
        let actor = Actor::new(UserId::new("creator-1").unwrap(), Role::Agent);
        input.into_audit(&actor, Timestamp::now())
    }

    fn make_package(venta_id: AuditId) -> EvidencePackage {
        EvidencePackage {
            venta_id,
            estado: EvidenceState::InProgress,
            file_path: "evidence/x.pdf".to_string(),
            original_name: "x.pdf".to_string(),
            file_size_kb: 10,
            uploaded_by: UserId::new("backoffice-1").unwrap(),
            uploaded_at: Timestamp::now(),
            is_locked: false,
        }
    }

    // ── Audit primitives ─────────────────────────────────────────────

    #[test]
    fn test_insert_and_get() {
        let store = MemoryStore::new();
        let audit = store.insert_audit(make_audit("20-11111111-1")).unwrap();
        let fetched = store.get_audit(audit.id).unwrap();
        assert_eq!(fetched.cuil, audit.cuil);
    }

    #[test]
    fn test_get_unknown_id_fails() {
        let store = MemoryStore::new();
        let id = AuditId::new();
        assert_eq!(store.get_audit(id).unwrap_err(), StoreError::AuditNotFound(id));
    }

    #[test]
    fn test_duplicate_cuil_rejected_regardless_of_date() {
        let store = MemoryStore::new();
        store.insert_audit(make_audit("20-11111111-1")).unwrap();

        let mut second = make_audit("20-11111111-1");
        second.scheduled_at += chrono::Duration::days(30);
        let err = store.insert_audit(second).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCuil(_)));
    }

    #[test]
    fn test_update_audit_is_visible_to_readers() {
        let store = MemoryStore::new();
        let audit = store.insert_audit(make_audit("20-11111111-1")).unwrap();
        store
            .update_audit(audit.id, |a| a.status = AuditStatus::Loaded)
            .unwrap();
        assert_eq!(store.get_audit(audit.id).unwrap().status, AuditStatus::Loaded);
    }

    #[test]
    fn test_remove_frees_cuil_and_evidence() {
        let store = MemoryStore::new();
        let audit = store.insert_audit(make_audit("20-11111111-1")).unwrap();
        store.put_evidence(make_package(audit.id));

        store.remove_audit(audit.id).unwrap();
        assert!(!store.contains_cuil(&Cuil::parse("20-11111111-1").unwrap()));
        assert!(store.get_evidence(audit.id).is_none());
        // The CUIL is reusable after removal.
        store.insert_audit(make_audit("20-11111111-1")).unwrap();
    }

    #[test]
    fn test_count_scheduled_in_window_is_half_open() {
        let store = MemoryStore::new();
        let base = NaiveDate::from_ymd_opt(2026, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        let mut inside = make_audit("20-11111111-1");
        inside.scheduled_at = base;
        store.insert_audit(inside).unwrap();

        let mut at_boundary = make_audit("20-22222222-2");
        at_boundary.scheduled_at = base + chrono::Duration::minutes(20);
        store.insert_audit(at_boundary).unwrap();

        let window = base..base + chrono::Duration::minutes(20);
        assert_eq!(store.count_scheduled_in(window), 1);
    }

    // ── Evidence primitives ──────────────────────────────────────────

    #[test]
    fn test_put_evidence_replaces_in_place() {
        let store = MemoryStore::new();
        let audit = store.insert_audit(make_audit("20-11111111-1")).unwrap();
        store.put_evidence(make_package(audit.id));

        let mut replacement = make_package(audit.id);
        replacement.original_name = "y.pdf".to_string();
        store.put_evidence(replacement);

        let stored = store.get_evidence(audit.id).unwrap();
        assert_eq!(stored.original_name, "y.pdf");
    }

    #[test]
    fn test_update_evidence_unknown_audit_fails() {
        let store = MemoryStore::new();
        let id = AuditId::new();
        let err = store.update_evidence(id, |_| {}).unwrap_err();
        assert_eq!(err, StoreError::EvidenceNotFound(id));
    }
}
