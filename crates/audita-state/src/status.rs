//! # Audit Status Set & Recovery Eligibility
//!
//! The closed set of audit statuses and the rule that derives the
//! recovery-eligibility deadline from a status write.
//!
//! ## Buckets
//!
//! The statuses partition into four **non-exclusive** semantic buckets,
//! consulted only by eligibility and evidence logic:
//!
//! - *pre-verification* — the audit has not yet been through the
//!   verification call.
//! - *recoverable* — the sale stalled in a state operations can rescue;
//!   entering one of these arms the 24-hour recovery timer.
//! - *terminal-success* — the sale progressed past verification.
//! - *terminal-failure* — the sale is lost.
//!
//! `Rejected` is both recoverable and a failure: a rejected sale is lost
//! as-is but routinely rescued through the recovery queue.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use audita_core::Timestamp;

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised when interpreting status values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    /// The string is not one of the known status values.
    #[error("unknown audit status {0:?}")]
    Unknown(String),
}

// ─── AuditStatus ─────────────────────────────────────────────────────

/// Hours between entering a recoverable status and becoming eligible for
/// the recovery pool.
pub const RECOVERY_DELAY_HOURS: i64 = 24;

/// The closed set of audit statuses.
///
/// Wire names are hyphenated Train-Case (`Missing-Credential`); parsing
/// rejects anything outside the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AuditStatus {
    /// Appointment booked; nothing has happened yet. The initial status.
    Scheduled,
    /// Appointment moved to a new slot.
    Rescheduled,
    /// Prospect confirmed the appointment.
    Confirmed,
    /// Prospect did not pick up at the appointed time.
    NoAnswer,
    /// Prospect was absent from the verification call.
    Absent,
    /// Appointment pushed back without a new slot.
    Postponed,
    /// Documentation loaded, ready for verification.
    Loaded,
    /// Verification call in progress.
    InReview,
    /// Stalled: prospect is missing the fiscal credential.
    MissingCredential,
    /// Stalled: prospect is missing required documentation.
    MissingDocumentation,
    /// Stalled: missing both credential and documentation.
    ///
    /// Note: this composite state does **not** arm the recovery timer —
    /// only the three states in [`AuditStatus::triggers_recovery_timer`]
    /// do. Confirm with operations before widening that set.
    MissingCredentialAndDocumentation,
    /// Verification rejected the sale.
    Rejected,
    /// Verification succeeded. The single status that gates evidence
    /// completion.
    Verified,
    /// Verification succeeded but supervisor approval is pending.
    /// Deliberately distinct from [`AuditStatus::Verified`] for every
    /// evidence rule.
    VerifiedPendingApproval,
    /// Approved, awaiting the prospect's signature.
    PendingSignature,
    /// Policy signed.
    Signed,
    /// Sale completed, commission pending.
    Completed,
    /// Sale fully settled. Hard-terminal for evidence purposes.
    FullyCompleted,
    /// Prospect dropped out of the process.
    Dropped,
    /// Sale cancelled before verification.
    Cancelled,
}

impl AuditStatus {
    /// The initial status assigned at creation.
    pub const INITIAL: AuditStatus = AuditStatus::Scheduled;

    /// The single verification-success status that gates evidence
    /// completion.
    pub const VERIFICATION_SUCCESS: AuditStatus = AuditStatus::Verified;

    /// Every status in wire-name order.
    pub const ALL: [AuditStatus; 20] = [
        Self::Scheduled,
        Self::Rescheduled,
        Self::Confirmed,
        Self::NoAnswer,
        Self::Absent,
        Self::Postponed,
        Self::Loaded,
        Self::InReview,
        Self::MissingCredential,
        Self::MissingDocumentation,
        Self::MissingCredentialAndDocumentation,
        Self::Rejected,
        Self::Verified,
        Self::VerifiedPendingApproval,
        Self::PendingSignature,
        Self::Signed,
        Self::Completed,
        Self::FullyCompleted,
        Self::Dropped,
        Self::Cancelled,
    ];

    /// The canonical wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Rescheduled => "Rescheduled",
            Self::Confirmed => "Confirmed",
            Self::NoAnswer => "No-Answer",
            Self::Absent => "Absent",
            Self::Postponed => "Postponed",
            Self::Loaded => "Loaded",
            Self::InReview => "In-Review",
            Self::MissingCredential => "Missing-Credential",
            Self::MissingDocumentation => "Missing-Documentation",
            Self::MissingCredentialAndDocumentation => "Missing-Credential-and-Documentation",
            Self::Rejected => "Rejected",
            Self::Verified => "Verified",
            Self::VerifiedPendingApproval => "Verified-Pending-Approval",
            Self::PendingSignature => "Pending-Signature",
            Self::Signed => "Signed",
            Self::Completed => "Completed",
            Self::FullyCompleted => "Fully-Completed",
            Self::Dropped => "Dropped",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether the audit has not yet been through verification.
    pub fn is_pre_verification(&self) -> bool {
        matches!(
            self,
            Self::Scheduled
                | Self::Rescheduled
                | Self::Confirmed
                | Self::NoAnswer
                | Self::Absent
                | Self::Postponed
                | Self::Loaded
                | Self::InReview
        )
    }

    /// Whether entering this status arms the recovery timer.
    ///
    /// Exactly three members. `Missing-Credential-and-Documentation` is
    /// excluded even though it is semantically a stalled state.
    pub fn triggers_recovery_timer(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::Rejected | Self::MissingDocumentation
        )
    }

    /// Whether the sale progressed past verification.
    pub fn is_terminal_success(&self) -> bool {
        matches!(
            self,
            Self::Verified
                | Self::VerifiedPendingApproval
                | Self::PendingSignature
                | Self::Signed
                | Self::Completed
                | Self::FullyCompleted
        )
    }

    /// Whether the sale is lost.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::Rejected | Self::Dropped | Self::Cancelled)
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| StatusError::Unknown(s.to_string()))
    }
}

impl TryFrom<String> for AuditStatus {
    type Error = StatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AuditStatus> for String {
    fn from(status: AuditStatus) -> Self {
        status.as_str().to_string()
    }
}

// ─── Recovery eligibility rule ───────────────────────────────────────

/// The recovery-eligibility deadline implied by a status write at `now`.
///
/// `Some(now + 24h)` when `status` arms the recovery timer, `None` for
/// every other status. The caller overwrites the stored marker with this
/// value on **every** status write, so leaving a recoverable status
/// always clears the deadline.
pub fn recovery_eligible_after(status: AuditStatus, now: Timestamp) -> Option<Timestamp> {
    if status.triggers_recovery_timer() {
        Some(now.plus_hours(RECOVERY_DELAY_HOURS))
    } else {
        None
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
