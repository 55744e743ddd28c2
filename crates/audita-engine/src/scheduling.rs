//! # Slot Allocator
//!
//! Gates audit creation on two independent constraints — global identity
//! uniqueness and per-window booking capacity — and serves the read-only
//! available-slots walker.
//!
//! Appointment times are local wall-clock values throughout: parsed as
//! `NaiveDateTime`, compared by calendar date against "today", never
//! UTC-normalized.
//!
//! ## The two capacity constants
//!
//! [`SLOT_CREATE_CAPACITY`] is enforced at creation time;
//! [`SLOT_DISPLAY_CAPACITY`] is what the available-slots endpoint
//! advertises to callers. They are distinct on purpose: the upstream
//! system gates and displays with different caps, and unifying them by
//! guess would silently change booking behavior. Check with the system
//! owner which one is intended before merging them.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use thiserror::Error;

use audita_core::{Actor, Cuil, Timestamp};
use audita_store::{Audit, MemoryStore, NewAudit, StoreError};

// ─── Booking constants ───────────────────────────────────────────────

/// Width of one booking window, in minutes.
pub const SLOT_WINDOW_MINUTES: i64 = 20;

/// Bookings allowed per window at creation time.
pub const SLOT_CREATE_CAPACITY: usize = 4;

/// Capacity advertised per window by the available-slots listing.
/// Deliberately distinct from [`SLOT_CREATE_CAPACITY`]; see module docs.
pub const SLOT_DISPLAY_CAPACITY: usize = 5;

/// First bookable hour of the day (local wall clock).
pub const SLOT_DAY_START_HOUR: i64 = 9;

/// End of the bookable day, exclusive (local wall clock).
pub const SLOT_DAY_END_HOUR: i64 = 20;

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors raised by the creation gate. All three rejections are client
/// errors; none are transient or retryable.
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// The appointment's calendar date lies before today.
    #[error("appointment date {0} is in the past")]
    InvalidDate(NaiveDate),

    /// An audit with this CUIL already exists, regardless of date.
    #[error("an audit already exists for CUIL {0}")]
    DuplicateIdentity(Cuil),

    /// The 20-minute window holding this appointment is fully booked.
    #[error("slot starting {0} is fully booked")]
    SlotFull(NaiveDateTime),

    /// Underlying store rejection.
    #[error(transparent)]
    Store(StoreError),
}

// ─── Windows ─────────────────────────────────────────────────────────

/// The half-open 20-minute grid window containing `at`.
///
/// Windows are aligned to the 20-minute grid from midnight, so a booking
/// at 10:05 counts against the same window as one at 10:00. The slot
/// picker books on exact boundaries; off-boundary requests still land in
/// the grid slot that covers them.
fn window_containing(at: NaiveDateTime) -> std::ops::Range<NaiveDateTime> {
    let midnight = at.date().and_time(NaiveTime::MIN);
    let minutes_into_day = (at - midnight).num_minutes();
    let aligned = minutes_into_day - minutes_into_day % SLOT_WINDOW_MINUTES;
    let start = midnight + Duration::minutes(aligned);
    start..start + Duration::minutes(SLOT_WINDOW_MINUTES)
}

// ─── AvailableSlot ───────────────────────────────────────────────────

/// One 20-minute boundary in the available-slots listing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AvailableSlot {
    /// Window start, `"HH:MM"` local wall clock.
    pub time: String,
    /// Audits already booked in this window.
    pub count: usize,
    /// The advertised per-window capacity.
    pub capacity: usize,
}

// ─── SlotAllocator ───────────────────────────────────────────────────

/// Creation gate and slot listing over the shared store.
pub struct SlotAllocator {
    store: Arc<MemoryStore>,
}

impl SlotAllocator {
    /// Build the allocator over a store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a new audit.
    ///
    /// The uniqueness check and the capacity count are each a
    /// read-then-insert sequence; the store's unique CUIL index backstops
    /// the first, the capacity count has no backstop beyond the store's
    /// write lock.
    ///
    /// # Errors
    ///
    /// [`SchedulingError::InvalidDate`] when the appointment date is
    /// before `today`; [`SchedulingError::DuplicateIdentity`] when the
    /// CUIL is taken; [`SchedulingError::SlotFull`] when the window is at
    /// creation capacity.
    pub fn create_audit(
        &self,
        input: NewAudit,
        actor: &Actor,
        today: NaiveDate,
        now: Timestamp,
    ) -> Result<Audit, SchedulingError> {
        // Date-only comparison: a this-morning appointment created this
        // afternoon is still valid.
        if input.scheduled_at.date() < today {
            return Err(SchedulingError::InvalidDate(input.scheduled_at.date()));
        }

        if self.store.contains_cuil(&input.cuil) {
            return Err(SchedulingError::DuplicateIdentity(input.cuil));
        }

        let window = window_containing(input.scheduled_at);
        let window_start = window.start;
        let booked = self.store.count_scheduled_in(window);
        if booked >= SLOT_CREATE_CAPACITY {
            return Err(SchedulingError::SlotFull(window_start));
        }

        let audit = input.into_audit(actor, now);
        let inserted = self.store.insert_audit(audit).map_err(|e| match e {
            // Concurrent create slipped past the pre-check; surface it as
            // the same client error.
            StoreError::DuplicateCuil(cuil) => SchedulingError::DuplicateIdentity(cuil),
            other => SchedulingError::Store(other),
        })?;
        tracing::info!(
            audit = %inserted.id,
            cuil = %inserted.cuil,
            scheduled_at = %inserted.scheduled_at,
            "audit created"
        );
        Ok(inserted)
    }

    /// Booking counts for every 20-minute boundary of `date`, from
    /// [`SLOT_DAY_START_HOUR`] to [`SLOT_DAY_END_HOUR`] exclusive.
    ///
    /// Read-only: enforcement lives solely in [`Self::create_audit`].
    pub fn list_available_slots(&self, date: NaiveDate) -> Vec<AvailableSlot> {
        let midnight = date.and_time(NaiveTime::MIN);
        let day_start = midnight + Duration::hours(SLOT_DAY_START_HOUR);
        let day_end = midnight + Duration::hours(SLOT_DAY_END_HOUR);

        let mut slots = Vec::new();
        let mut boundary = day_start;
        while boundary < day_end {
            let window = boundary..boundary + Duration::minutes(SLOT_WINDOW_MINUTES);
            let count = self.store.count_scheduled_in(window);
            slots.push(AvailableSlot {
                time: boundary.format("%H:%M").to_string(),
                count,
                capacity: SLOT_DISPLAY_CAPACITY,
            });
            boundary += Duration::minutes(SLOT_WINDOW_MINUTES);
        }
        slots
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
