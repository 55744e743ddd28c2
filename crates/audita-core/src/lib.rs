//! # audita-core — Foundational Types for the Audita Stack
//!
//! This crate is the bedrock of the Audita Stack. It defines the primitive
//! types shared by every other crate in the workspace; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Cuil`, `AuditId`,
//!    `UserId` — all newtypes with validated constructors. No bare strings
//!    for identifiers.
//!
//! 2. **UTC-only bookkeeping timestamps.** The `Timestamp` type is UTC with
//!    seconds precision. The one deliberate exception — appointment times,
//!    which are local wall-clock values — lives outside this crate as a
//!    plain `chrono::NaiveDateTime` and is never converted to UTC.
//!
//! 3. **Closed role set.** One `Role` enum, eight variants, exhaustive
//!    `match` everywhere. Adding a role forces every consumer to handle it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `audita-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod actor;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use actor::{Actor, Role};
pub use error::CoreError;
pub use identity::{AuditId, Cuil, UserId};
pub use temporal::Timestamp;
