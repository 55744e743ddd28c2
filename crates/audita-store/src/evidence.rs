//! # Evidence Package Record
//!
//! At most one per audit, created lazily on the first successful upload.
//! The `is_locked` field is persisted for read efficiency but is always a
//! recomputation of `should_lock(audit.status, has_file)` at the last
//! mutating operation — clients can never set it.

use serde::{Deserialize, Serialize};

use audita_core::{AuditId, Timestamp, UserId};
use audita_state::EvidenceState;

/// The single proof-of-sale file bundle attached to one audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidencePackage {
    /// Owning audit. Unique — enforces the 1:1 relation.
    pub venta_id: AuditId,
    /// Package lifecycle state.
    pub estado: EvidenceState,
    /// Storage path of the current file.
    pub file_path: String,
    /// Client-supplied name of the uploaded file.
    pub original_name: String,
    /// File size in kilobytes.
    pub file_size_kb: u64,
    /// Actor who performed the last upload.
    pub uploaded_by: UserId,
    /// When the last upload happened.
    pub uploaded_at: Timestamp,
    /// Derived lock state at the last mutating operation.
    pub is_locked: bool,
}

impl EvidencePackage {
    /// Whether a usable file is attached.
    pub fn has_file(&self) -> bool {
        !self.file_path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_package() -> EvidencePackage {
        EvidencePackage {
            venta_id: AuditId::new(),
            estado: EvidenceState::InProgress,
            file_path: "evidence/abc.pdf".to_string(),
            original_name: "contrato.pdf".to_string(),
            file_size_kb: 120,
            uploaded_by: UserId::new("backoffice-1").unwrap(),
            uploaded_at: Timestamp::now(),
            is_locked: false,
        }
    }

    #[test]
    fn test_has_file() {
        let mut pkg = sample_package();
        assert!(pkg.has_file());
        pkg.file_path.clear();
        assert!(!pkg.has_file());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_value(sample_package()).unwrap();
        assert!(json.get("ventaId").is_some());
        assert!(json.get("fileSizeKb").is_some());
        assert!(json.get("isLocked").is_some());
        assert_eq!(json.get("estado").unwrap(), "in_progress");
    }
}
