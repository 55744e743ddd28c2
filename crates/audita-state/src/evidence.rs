//! # Evidence Lock Derivation
//!
//! The evidence package's mutability is a **projection** of the owning
//! audit's current status plus file presence — never stored state that a
//! client can set. These three pure functions are re-evaluated by
//! `audita-engine` on every mutating evidence operation.

use serde::{Deserialize, Serialize};

use crate::status::AuditStatus;

// ─── EvidenceState ───────────────────────────────────────────────────

/// The lifecycle state of an evidence package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceState {
    /// Package exists but holds no usable file.
    Incomplete,
    /// A file has been uploaded; the package is still mutable.
    InProgress,
    /// The proof-of-sale bundle is finalized.
    Complete,
}

impl EvidenceState {
    /// The canonical wire name of this state (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for EvidenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Derivation rules ────────────────────────────────────────────────

/// Whether an audit in `status` may carry evidence at all.
///
/// False only for the three hard-terminal states — every other status,
/// including early pipeline states, accepts uploads.
pub fn is_eligible_for_evidence(status: AuditStatus) -> bool {
    !matches!(
        status,
        AuditStatus::Rejected | AuditStatus::Dropped | AuditStatus::FullyCompleted
    )
}

/// Whether the package may transition to [`EvidenceState::Complete`].
///
/// True only for the single verification-success status. The
/// pending-approval variant of that status returns false.
pub fn can_mark_complete(status: AuditStatus) -> bool {
    status == AuditStatus::VERIFICATION_SUCCESS
}

/// Whether the package is locked against further mutation.
///
/// Locking engages only once the audit sits at the verification-success
/// status **and** a file is attached; an audit that just reached that
/// status with no file yet is still open for the first upload.
pub fn should_lock(status: AuditStatus, has_file: bool) -> bool {
    status == AuditStatus::VERIFICATION_SUCCESS && has_file
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Eligibility ──────────────────────────────────────────────────

    #[test]
    fn test_hard_terminal_states_are_ineligible() {
        assert!(!is_eligible_for_evidence(AuditStatus::Rejected));
        assert!(!is_eligible_for_evidence(AuditStatus::Dropped));
        assert!(!is_eligible_for_evidence(AuditStatus::FullyCompleted));
    }

    #[test]
    fn test_early_pipeline_states_are_eligible() {
        assert!(is_eligible_for_evidence(AuditStatus::Scheduled));
        assert!(is_eligible_for_evidence(AuditStatus::Loaded));
        assert!(is_eligible_for_evidence(AuditStatus::MissingCredential));
    }

    #[test]
    fn test_all_but_three_statuses_are_eligible() {
        let ineligible = AuditStatus::ALL
            .iter()
            .filter(|s| !is_eligible_for_evidence(**s))
            .count();
        assert_eq!(ineligible, 3);
    }

    // ── Completion gate ──────────────────────────────────────────────

    #[test]
    fn test_only_verified_can_mark_complete() {
        for status in AuditStatus::ALL {
            assert_eq!(
                can_mark_complete(status),
                status == AuditStatus::Verified,
                "completion gate wrong for {status}"
            );
        }
    }

    #[test]
    fn test_pending_approval_variant_cannot_complete() {
        assert!(!can_mark_complete(AuditStatus::VerifiedPendingApproval));
    }

    // ── Lock derivation ──────────────────────────────────────────────

    #[test]
    fn test_verified_without_file_is_unlocked() {
        assert!(!should_lock(AuditStatus::Verified, false));
    }

    #[test]
    fn test_verified_with_file_is_locked() {
        assert!(should_lock(AuditStatus::Verified, true));
    }

    #[test]
    fn test_non_verified_never_locks() {
        for status in AuditStatus::ALL {
            if status != AuditStatus::Verified {
                assert!(!should_lock(status, true), "lock engaged for {status}");
            }
        }
    }

    // ── Wire names ───────────────────────────────────────────────────

    #[test]
    fn test_evidence_state_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&EvidenceState::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn test_evidence_state_display() {
        assert_eq!(EvidenceState::Incomplete.to_string(), "incomplete");
        assert_eq!(EvidenceState::Complete.to_string(), "complete");
    }
}
