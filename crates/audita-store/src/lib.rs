//! # audita-store — Records & Keyed Store
//!
//! The persisted shape of the two entities in scope — the audit record and
//! its optional evidence package — plus `MemoryStore`, the in-process
//! keyed collection they live in.
//!
//! ## Store model
//!
//! Each audit and its evidence package are distinct entries joined by the
//! audit's identifier. The store offers exactly one write primitive per
//! record: an atomic closure-based update under the collection lock. There
//! is no cross-record transaction — the engine's contracts are all
//! expressed as at most one read-check sequence followed by one write.
//!
//! The store also maintains a unique index on `cuil` as a backstop for the
//! slot allocator's duplicate-identity pre-check: even if two concurrent
//! creation requests both pass the pre-check, the second insert fails
//! here.
//!
//! ## Crate Policy
//!
//! - No business rules: eligibility, visibility, capacity, and lock
//!   derivation all live in `audita-engine`. The store stores.

pub mod audit;
pub mod evidence;
pub mod memory;

// ─── Record re-exports ───────────────────────────────────────────────

pub use audit::{Audit, AuditPatch, MediaRefs, NewAudit};
pub use evidence::EvidencePackage;

// ─── Store re-exports ────────────────────────────────────────────────

pub use memory::{MemoryStore, StoreError};
