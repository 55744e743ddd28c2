//! # Evidence Lock Synchronizer
//!
//! Keeps an evidence package's mutability consistent with its owning
//! audit's status. The lock is never stored as client-settable state —
//! every mutating operation re-derives it from the audit's current status
//! plus file presence via the pure rules in `audita_state::evidence`.
//!
//! File bytes live in a [`BlobStore`]; the filesystem implementation
//! writes through a temporary `.part` path and renames into place, with
//! best-effort cleanup of the partial file on failure. Blob replacement
//! is not atomic with the record update: a crash between the two steps
//! can orphan a file or dangle a reference. Known gap.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use audita_core::{Actor, AuditId, Role, Timestamp};
use audita_state::{can_mark_complete, is_eligible_for_evidence, should_lock, AuditStatus, EvidenceState};
use audita_store::{EvidencePackage, MemoryStore, StoreError};

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by evidence operations.
#[derive(Error, Debug)]
pub enum EvidenceError {
    /// The owning audit does not exist.
    #[error("audit {0} not found")]
    AuditNotFound(AuditId),

    /// No evidence package exists for this audit.
    #[error("no evidence package for audit {0}")]
    PackageNotFound(AuditId),

    /// The owning audit's status does not accept evidence.
    #[error("audit {id} in status {status} does not accept evidence")]
    NotEligible {
        /// The owning audit.
        id: AuditId,
        /// Its current status.
        status: AuditStatus,
    },

    /// The package is locked against mutation.
    #[error("evidence package for audit {0} is locked")]
    Locked(AuditId),

    /// No file is attached to the package.
    #[error("no file attached to evidence package for audit {0}")]
    NoFile(AuditId),

    /// Completion attempted outside the verification-success status.
    #[error("evidence completion requires audit status {required}, found {found}")]
    WrongAuditState {
        /// The single status that permits completion.
        required: AuditStatus,
        /// The audit's actual status.
        found: AuditStatus,
    },

    /// The actor's role may not perform this operation.
    #[error("role {role} may not {action}")]
    ForbiddenRole {
        /// The rejected role.
        role: Role,
        /// The attempted action.
        action: &'static str,
    },

    /// The record references a file that is gone from storage.
    #[error("evidence file for audit {0} is missing from storage")]
    FileMissing(AuditId),

    /// Blob storage failed; any partial write was cleaned up best-effort.
    #[error("evidence storage failure: {0}")]
    Storage(#[source] io::Error),
}

impl From<StoreError> for EvidenceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AuditNotFound(id) => Self::AuditNotFound(id),
            StoreError::EvidenceNotFound(id) => Self::PackageNotFound(id),
            // The CUIL index is never touched by evidence operations.
            StoreError::DuplicateCuil(_) => {
                Self::Storage(io::Error::other(err.to_string()))
            }
        }
    }
}

// ─── BlobStore ───────────────────────────────────────────────────────

/// Byte storage for evidence files, keyed by an opaque relative path.
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` under `key`, replacing any previous content.
    fn save(&self, key: &str, bytes: &[u8]) -> io::Result<()>;

    /// Remove the blob under `key`.
    fn delete(&self, key: &str) -> io::Result<()>;

    /// Read the blob under `key`.
    fn load(&self, key: &str) -> io::Result<Vec<u8>>;
}

/// Filesystem blob store rooted at one directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `root`. The directory is created on the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobStore for FsBlobStore {
    fn save(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.root.join(key);
        let tmp = self.root.join(format!("{key}.part"));
        if let Err(err) = std::fs::write(&tmp, bytes) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err);
        }
        if let Err(err) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> io::Result<()> {
        std::fs::remove_file(self.root.join(key))
    }

    fn load(&self, key: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(key))
    }
}

// ─── Upload input ────────────────────────────────────────────────────

/// One uploaded file, as received from the multipart layer.
#[derive(Debug, Clone)]
pub struct EvidenceUpload {
    /// Client-supplied file name.
    pub original_name: String,
    /// File content.
    pub bytes: Vec<u8>,
}

// ─── EvidenceService ─────────────────────────────────────────────────

/// Upload, completion, and download over the shared store and a blob
/// store.
pub struct EvidenceService {
    store: Arc<MemoryStore>,
    blobs: Arc<dyn BlobStore>,
}

impl EvidenceService {
    /// Build the service over a store and a blob store.
    pub fn new(store: Arc<MemoryStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Upload or replace the evidence file for an audit.
    ///
    /// Creates the package lazily on the first upload (`in_progress`,
    /// unlocked). A replacement deletes the previous blob and leaves the
    /// package state untouched.
    pub fn upload(
        &self,
        venta_id: AuditId,
        upload: EvidenceUpload,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<EvidencePackage, EvidenceError> {
        require_handler_role(actor, "upload evidence")?;

        let audit = self.store.get_audit(venta_id)?;
        if !is_eligible_for_evidence(audit.status) {
            return Err(EvidenceError::NotEligible {
                id: venta_id,
                status: audit.status,
            });
        }

        let existing = self.store.get_evidence(venta_id);
        if existing.as_ref().is_some_and(|p| p.is_locked) {
            return Err(EvidenceError::Locked(venta_id));
        }

        let key = blob_key(venta_id, &upload.original_name);
        let file_size_kb = (upload.bytes.len() as u64).div_ceil(1024);
        self.blobs
            .save(&key, &upload.bytes)
            .map_err(EvidenceError::Storage)?;

        let package = match existing {
            Some(previous) => {
                if previous.file_path != key {
                    // Replacement: the old blob goes away. Failure here
                    // leaves an orphaned file, not a broken record.
                    if let Err(err) = self.blobs.delete(&previous.file_path) {
                        tracing::warn!(
                            audit = %venta_id,
                            path = %previous.file_path,
                            error = %err,
                            "failed to delete replaced evidence file"
                        );
                    }
                }
                self.store.update_evidence(venta_id, |pkg| {
                    pkg.file_path = key.clone();
                    pkg.original_name = upload.original_name.clone();
                    pkg.file_size_kb = file_size_kb;
                    pkg.uploaded_by = actor.id.clone();
                    pkg.uploaded_at = now;
                })?
            }
            None => self.store.put_evidence(EvidencePackage {
                venta_id,
                estado: EvidenceState::InProgress,
                file_path: key,
                original_name: upload.original_name,
                file_size_kb,
                uploaded_by: actor.id.clone(),
                uploaded_at: now,
                is_locked: false,
            }),
        };
        tracing::info!(audit = %venta_id, uploader = %actor.id, "evidence uploaded");
        Ok(package)
    }

    /// Finalize the package as the proof-of-sale bundle.
    ///
    /// Permitted only while the owning audit sits at the single
    /// verification-success status; once completed with a file attached,
    /// the package locks.
    pub fn mark_complete(
        &self,
        venta_id: AuditId,
        actor: &Actor,
    ) -> Result<EvidencePackage, EvidenceError> {
        require_handler_role(actor, "complete evidence")?;

        let package = self
            .store
            .get_evidence(venta_id)
            .ok_or(EvidenceError::NoFile(venta_id))?;
        if !package.has_file() {
            return Err(EvidenceError::NoFile(venta_id));
        }

        let audit = self.store.get_audit(venta_id)?;
        if !can_mark_complete(audit.status) {
            return Err(EvidenceError::WrongAuditState {
                required: AuditStatus::VERIFICATION_SUCCESS,
                found: audit.status,
            });
        }
        if package.is_locked {
            return Err(EvidenceError::Locked(venta_id));
        }

        let has_file = package.has_file();
        let updated = self.store.update_evidence(venta_id, |pkg| {
            pkg.estado = EvidenceState::Complete;
            pkg.is_locked = should_lock(audit.status, has_file);
        })?;
        tracing::info!(audit = %venta_id, locked = updated.is_locked, "evidence completed");
        Ok(updated)
    }

    /// Fetch the package record and its file bytes, role-gated by
    /// package state: a complete package is management-only, an
    /// unfinished one also admits the back office.
    pub fn download(
        &self,
        venta_id: AuditId,
        actor: &Actor,
    ) -> Result<(EvidencePackage, Vec<u8>), EvidenceError> {
        let package = self
            .store
            .get_evidence(venta_id)
            .ok_or(EvidenceError::PackageNotFound(venta_id))?;

        let permitted = match package.estado {
            EvidenceState::Complete => actor.role == Role::Management,
            EvidenceState::Incomplete | EvidenceState::InProgress => {
                matches!(actor.role, Role::Management | Role::BackOffice)
            }
        };
        if !permitted {
            return Err(EvidenceError::ForbiddenRole {
                role: actor.role,
                action: "download evidence",
            });
        }

        let bytes = self.blobs.load(&package.file_path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                EvidenceError::FileMissing(venta_id)
            } else {
                EvidenceError::Storage(err)
            }
        })?;
        Ok((package, bytes))
    }
}

/// Evidence handling is a back-office concern; management and
/// administrators share the gate.
fn require_handler_role(actor: &Actor, action: &'static str) -> Result<(), EvidenceError> {
    match actor.role {
        Role::BackOffice | Role::Administrator | Role::Management => Ok(()),
        role => Err(EvidenceError::ForbiddenRole { role, action }),
    }
}

/// Blob key for an audit's current file: audit UUID plus the sanitized
/// client file name.
fn blob_key(venta_id: AuditId, original_name: &str) -> String {
    let safe: String = original_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}-{}", venta_id.as_uuid(), safe)
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use audita_core::{Cuil, UserId};
    use audita_store::{Audit, MediaRefs, NewAudit};

    fn t0() -> Timestamp {
        Timestamp::parse("2026-03-01T10:00:00Z").unwrap()
    }

    fn back_office() -> Actor {
        Actor::new(UserId::new("bo-1").unwrap(), Role::BackOffice)
    }

    fn management() -> Actor {
        Actor::new(UserId::new("mgmt-1").unwrap(), Role::Management)
    }

    fn upload_input(name: &str) -> EvidenceUpload {
        EvidenceUpload {
            original_name: name.to_string(),
            bytes: b"pdf bytes".to_vec(),
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        service: EvidenceService,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(FsBlobStore::new(dir.path()));
        let service = EvidenceService::new(Arc::clone(&store), blobs);
        Fixture {
            store,
            service,
            _dir: dir,
        }
    }

    fn seed_audit(store: &MemoryStore, status: AuditStatus) -> Audit {
        let input = NewAudit {
            cuil: Cuil::parse("20-11111111-1").unwrap(),
            asesor: UserId::new("asesor-1").unwrap(),
            administrador: None,
            numero_equipo: None,
            scheduled_at: NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            datos_extra: None,
            media: MediaRefs::default(),
        };
        let creator = Actor::new(UserId::new("creator-1").unwrap(), Role::Agent);
        let audit = store.insert_audit(input.into_audit(&creator, t0())).unwrap();
        store
            .update_audit(audit.id, |a| a.status = status)
            .unwrap()
    }

    // ── Upload ───────────────────────────────────────────────────────

    #[test]
    fn test_first_upload_creates_in_progress_unlocked() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::Loaded);

        let pkg = f
            .service
            .upload(audit.id, upload_input("contrato.pdf"), &back_office(), t0())
            .unwrap();
        assert_eq!(pkg.estado, EvidenceState::InProgress);
        assert!(!pkg.is_locked);
        assert_eq!(pkg.original_name, "contrato.pdf");
        assert_eq!(pkg.file_size_kb, 1);
    }

    #[test]
    fn test_upload_rejected_for_hard_terminal_audit() {
        let f = fixture();
        for status in [
            AuditStatus::Rejected,
            AuditStatus::Dropped,
            AuditStatus::FullyCompleted,
        ] {
            let audit = seed_audit(&f.store, status);
            let err = f
                .service
                .upload(audit.id, upload_input("x.pdf"), &back_office(), t0())
                .unwrap_err();
            assert!(matches!(err, EvidenceError::NotEligible { .. }));
            f.store.remove_audit(audit.id).unwrap();
        }
    }

    #[test]
    fn test_upload_rejected_for_unknown_audit() {
        let f = fixture();
        let err = f
            .service
            .upload(AuditId::new(), upload_input("x.pdf"), &back_office(), t0())
            .unwrap_err();
        assert!(matches!(err, EvidenceError::AuditNotFound(_)));
    }

    #[test]
    fn test_upload_rejected_for_agent_role() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::Loaded);
        let agent = Actor::new(UserId::new("agent-1").unwrap(), Role::Agent);
        let err = f
            .service
            .upload(audit.id, upload_input("x.pdf"), &agent, t0())
            .unwrap_err();
        assert!(matches!(err, EvidenceError::ForbiddenRole { .. }));
    }

    #[test]
    fn test_reupload_replaces_file_and_keeps_state() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::Loaded);
        let first = f
            .service
            .upload(audit.id, upload_input("v1.pdf"), &back_office(), t0())
            .unwrap();

        let second = f
            .service
            .upload(audit.id, upload_input("v2.pdf"), &back_office(), t0().plus_hours(1))
            .unwrap();
        assert_eq!(second.estado, EvidenceState::InProgress);
        assert_eq!(second.original_name, "v2.pdf");
        // The replaced blob is gone.
        let blobs = FsBlobStore::new(f._dir.path());
        assert!(blobs.load(&first.file_path).is_err());
        assert!(blobs.load(&second.file_path).is_ok());
    }

    // ── Completion ───────────────────────────────────────────────────

    #[test]
    fn test_full_lifecycle_upload_verify_complete_lock() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::Loaded);

        // Evidence created while the audit is still in the pipeline.
        let pkg = f
            .service
            .upload(audit.id, upload_input("contrato.pdf"), &back_office(), t0())
            .unwrap();
        assert_eq!(pkg.estado, EvidenceState::InProgress);
        assert!(!pkg.is_locked);

        // Verification succeeds; completion is now permitted and locks.
        f.store
            .update_audit(audit.id, |a| a.status = AuditStatus::Verified)
            .unwrap();
        let completed = f.service.mark_complete(audit.id, &back_office()).unwrap();
        assert_eq!(completed.estado, EvidenceState::Complete);
        assert!(completed.is_locked);

        // Further uploads bounce off the lock.
        let err = f
            .service
            .upload(audit.id, upload_input("late.pdf"), &back_office(), t0())
            .unwrap_err();
        assert!(matches!(err, EvidenceError::Locked(_)));
    }

    #[test]
    fn test_complete_rejected_without_package() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::Verified);
        let err = f.service.mark_complete(audit.id, &back_office()).unwrap_err();
        assert!(matches!(err, EvidenceError::NoFile(_)));
    }

    #[test]
    fn test_complete_rejected_outside_verified() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::Loaded);
        f.service
            .upload(audit.id, upload_input("x.pdf"), &back_office(), t0())
            .unwrap();

        let err = f.service.mark_complete(audit.id, &back_office()).unwrap_err();
        match err {
            EvidenceError::WrongAuditState { required, found } => {
                assert_eq!(required, AuditStatus::Verified);
                assert_eq!(found, AuditStatus::Loaded);
            }
            other => panic!("expected WrongAuditState, got: {other:?}"),
        }
    }

    #[test]
    fn test_complete_rejected_for_pending_approval_variant() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::VerifiedPendingApproval);
        f.service
            .upload(audit.id, upload_input("x.pdf"), &back_office(), t0())
            .unwrap();
        let err = f.service.mark_complete(audit.id, &back_office()).unwrap_err();
        assert!(matches!(err, EvidenceError::WrongAuditState { .. }));
    }

    #[test]
    fn test_complete_twice_rejected_as_locked() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::Verified);
        f.service
            .upload(audit.id, upload_input("x.pdf"), &back_office(), t0())
            .unwrap();
        f.service.mark_complete(audit.id, &back_office()).unwrap();

        let err = f.service.mark_complete(audit.id, &back_office()).unwrap_err();
        assert!(matches!(err, EvidenceError::Locked(_)));
    }

    // ── Download ─────────────────────────────────────────────────────

    #[test]
    fn test_download_in_progress_admits_back_office() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::Loaded);
        f.service
            .upload(audit.id, upload_input("x.pdf"), &back_office(), t0())
            .unwrap();

        let (pkg, bytes) = f.service.download(audit.id, &back_office()).unwrap();
        assert_eq!(pkg.estado, EvidenceState::InProgress);
        assert_eq!(bytes, b"pdf bytes");
    }

    #[test]
    fn test_download_complete_is_management_only() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::Verified);
        f.service
            .upload(audit.id, upload_input("x.pdf"), &back_office(), t0())
            .unwrap();
        f.service.mark_complete(audit.id, &back_office()).unwrap();

        let err = f.service.download(audit.id, &back_office()).unwrap_err();
        assert!(matches!(err, EvidenceError::ForbiddenRole { .. }));
        f.service.download(audit.id, &management()).unwrap();
    }

    #[test]
    fn test_download_rejected_for_other_roles() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::Loaded);
        f.service
            .upload(audit.id, upload_input("x.pdf"), &back_office(), t0())
            .unwrap();

        let auditor = Actor::new(UserId::new("aud-1").unwrap(), Role::Auditor);
        let err = f.service.download(audit.id, &auditor).unwrap_err();
        assert!(matches!(err, EvidenceError::ForbiddenRole { .. }));
    }

    #[test]
    fn test_download_without_package_is_not_found() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::Loaded);
        let err = f.service.download(audit.id, &management()).unwrap_err();
        assert!(matches!(err, EvidenceError::PackageNotFound(_)));
    }

    #[test]
    fn test_download_missing_blob_is_file_missing() {
        let f = fixture();
        let audit = seed_audit(&f.store, AuditStatus::Loaded);
        let pkg = f
            .service
            .upload(audit.id, upload_input("x.pdf"), &back_office(), t0())
            .unwrap();
        FsBlobStore::new(f._dir.path()).delete(&pkg.file_path).unwrap();

        let err = f.service.download(audit.id, &management()).unwrap_err();
        assert!(matches!(err, EvidenceError::FileMissing(_)));
    }

    // ── Blob keys ────────────────────────────────────────────────────

    #[test]
    fn test_blob_key_sanitizes_path_separators() {
        let id = AuditId::new();
        let key = blob_key(id, "../../etc/passwd");
        assert!(!key.contains('/'));
        assert!(key.starts_with(&id.as_uuid().to_string()));
    }
}
