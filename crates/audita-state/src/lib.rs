//! # audita-state — Status Semantics for the Audita Stack
//!
//! Defines the closed audit status set and the pure rules derived from it.
//! Everything here is side-effect free; the services in `audita-engine`
//! apply these rules against the store.
//!
//! ## Modules
//!
//! - **Status** (`status.rs`): the 20-value `AuditStatus` enumeration with
//!   its four non-exclusive semantic buckets (pre-verification,
//!   recoverable, terminal-success, terminal-failure) and the 24-hour
//!   recovery-eligibility rule.
//!
//! - **Evidence** (`evidence.rs`): `EvidenceState` and the three pure
//!   functions that derive an evidence package's eligibility, completion
//!   gate, and lock state from the owning audit's status.
//!
//! ## Design
//!
//! There is deliberately **no** transition graph between individual status
//! values — any actor permitted to write may set any value. The buckets
//! exist only for eligibility and evidence logic, so a plain enum with
//! predicate methods is the right machinery here; a typestate encoding
//! would promise transition safety this domain does not have.

pub mod evidence;
pub mod status;

// ─── Status re-exports ───────────────────────────────────────────────

pub use status::{recovery_eligible_after, AuditStatus, StatusError, RECOVERY_DELAY_HOURS};

// ─── Evidence re-exports ─────────────────────────────────────────────

pub use evidence::{can_mark_complete, is_eligible_for_evidence, should_lock, EvidenceState};
