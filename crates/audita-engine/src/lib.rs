//! # audita-engine — Core Services of the Audita Stack
//!
//! The four components with non-trivial invariants, implemented as
//! services over `audita-store`:
//!
//! - **Lifecycle** (`lifecycle.rs`): status writes with derived recovery
//!   eligibility, the manual recovery flag, the recovery-pool query, and
//!   the privileged edit/delete operations.
//!
//! - **Visibility** (`visibility.rs`): the role-scoped read predicate,
//!   the recovery-pool exclusion, the team directory, and the team-lead
//!   enrichment attached to listings.
//!
//! - **Scheduling** (`scheduling.rs`): the slot allocator gating audit
//!   creation on identity uniqueness and per-window capacity, and the
//!   read-only available-slots walker.
//!
//! - **Evidence** (`evidence.rs`): the evidence lock synchronizer — upload,
//!   completion, and download over a blob store, with mutability derived
//!   from the owning audit's status on every operation.
//!
//! ## Crate Policy
//!
//! - All timers are lazy: "eligible" is a comparison against a `now` the
//!   caller supplies, never a scheduled callback.
//! - Every operation is a synchronous request/response handler; the only
//!   blocking is the store lock and local file IO.
//! - Errors are typed per module; the API layer owns the mapping to
//!   response codes.

pub mod evidence;
pub mod lifecycle;
pub mod notify;
pub mod scheduling;
pub mod visibility;

// ─── Lifecycle re-exports ────────────────────────────────────────────

pub use lifecycle::{LifecycleEngine, LifecycleError, NewRecoveryEntry, PoolEntry, PoolReason};

// ─── Visibility re-exports ───────────────────────────────────────────

pub use visibility::{
    excludes_recovery, is_recovery_suppressed, AgentEntry, EnrichedAudit, TeamDirectory,
    VisibilityScope,
};

// ─── Scheduling re-exports ───────────────────────────────────────────

pub use scheduling::{
    AvailableSlot, SchedulingError, SlotAllocator, SLOT_CREATE_CAPACITY, SLOT_DAY_END_HOUR,
    SLOT_DAY_START_HOUR, SLOT_DISPLAY_CAPACITY, SLOT_WINDOW_MINUTES,
};

// ─── Evidence re-exports ─────────────────────────────────────────────

pub use evidence::{
    BlobStore, EvidenceError, EvidenceService, EvidenceUpload, FsBlobStore,
};

// ─── Notifier re-exports ─────────────────────────────────────────────

pub use notify::{AuditNotifier, TracingNotifier};
