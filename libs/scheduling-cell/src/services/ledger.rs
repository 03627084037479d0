// libs/scheduling-cell/src/services/ledger.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use rand::Rng;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    format_minute, Booking, BookingEvent, BookingRequest, BookingSearchQuery, BookingStatus,
    SchedulingError, SchedulingRules, SlotAvailability, MINUTES_PER_DAY,
};
use crate::services::calendar::BusinessCalendar;
use crate::services::lifecycle::BookingLifecycle;
use crate::services::slots::SlotGenerator;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The single authority for creating, cancelling and completing bookings.
///
/// Capacity guarantee: the count of Pending/Confirmed bookings overlapping
/// any minute never exceeds `capacity_per_slot`, even under concurrent
/// requests. The read-check-write sequence for a date runs under that
/// date's mutex; reads outside it may observe a slightly stale snapshot.
pub struct BookingLedger {
    calendar: Arc<BusinessCalendar>,
    slots: SlotGenerator,
    lifecycle: BookingLifecycle,
    rules: SchedulingRules,
    bookings: RwLock<HashMap<Uuid, Booking>>,
    date_locks: Mutex<HashMap<NaiveDate, Arc<Mutex<()>>>>,
    events: broadcast::Sender<BookingEvent>,
}

impl BookingLedger {
    pub fn new(calendar: Arc<BusinessCalendar>, rules: SchedulingRules) -> Self {
        let slots = SlotGenerator::new(Arc::clone(&calendar), rules.granularity_minutes);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            calendar,
            slots,
            lifecycle: BookingLifecycle::new(),
            rules,
            bookings: RwLock::new(HashMap::new()),
            date_locks: Mutex::new(HashMap::new()),
            events,
        }
    }

    pub fn rules(&self) -> &SchedulingRules {
        &self.rules
    }

    /// Subscribe to booking lifecycle events (confirmed, cancelled).
    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.events.subscribe()
    }

    // ==========================================================================
    // WRITE OPERATIONS
    // ==========================================================================

    /// Atomically check capacity and commit a new booking.
    ///
    /// Fails with `InvalidRequest` for past or malformed input, `OutOfHours`
    /// when the interval does not fit the date's open range, and `SlotFull`
    /// when every technician bench is taken. Failures leave the store
    /// untouched and are always safe to retry.
    pub async fn request_booking(
        &self,
        request: BookingRequest,
    ) -> Result<Booking, SchedulingError> {
        let duration = request.effective_duration();
        self.validate_request(&request, duration)?;

        let open = self
            .calendar
            .hours_for(request.date)
            .ok_or(SchedulingError::OutOfHours)?;
        if request.start_minute < open.opens_at
            || request.start_minute + duration > open.closes_at
        {
            return Err(SchedulingError::OutOfHours);
        }

        let date_lock = self.lock_for_date(request.date).await;
        let _guard = date_lock.lock().await;

        {
            let bookings = self.bookings.read().await;
            let remaining = remaining_capacity_in(
                &bookings,
                self.rules.capacity_per_slot,
                request.date,
                request.start_minute,
                duration,
            );
            if remaining <= 0 {
                debug!(
                    "Slot full on {} at {} for {} minutes",
                    request.date, request.start_minute, duration
                );
                return Err(SchedulingError::SlotFull);
            }
        }

        let now = Utc::now();
        let mut booking = Booking {
            id: Uuid::new_v4(),
            booking_number: generate_booking_number(),
            tracking_code: generate_tracking_code(),
            date: request.date,
            start_minute: request.start_minute,
            duration_minutes: duration,
            repair_type: request.repair_type,
            customer_ref: request.customer_ref,
            status: BookingStatus::Pending,
            created_at: now,
            last_transition_at: now,
        };

        // Pending covers only the validation window inside this critical
        // section; a committed booking is always Confirmed.
        booking.status = BookingStatus::Confirmed;
        booking.last_transition_at = Utc::now();

        self.bookings.write().await.insert(booking.id, booking.clone());

        info!(
            "Booking {} confirmed: {} on {} at {}",
            booking.booking_number,
            booking.repair_type,
            booking.date,
            format_minute(booking.start_minute)
        );
        self.emit(BookingEvent::Confirmed(booking.clone()));

        Ok(booking)
    }

    /// Transition a Pending/Confirmed booking to Cancelled, freeing its
    /// capacity for subsequent requests.
    pub async fn cancel_booking(&self, booking_id: Uuid) -> Result<Booking, SchedulingError> {
        let date = {
            let bookings = self.bookings.read().await;
            bookings
                .get(&booking_id)
                .ok_or(SchedulingError::NotFound)?
                .date
        };

        // Serialized with request_booking for the same date so capacity
        // bookkeeping never interleaves with a half-applied cancellation.
        let date_lock = self.lock_for_date(date).await;
        let _guard = date_lock.lock().await;

        let cancelled = {
            let mut bookings = self.bookings.write().await;
            let booking = bookings
                .get_mut(&booking_id)
                .ok_or(SchedulingError::NotFound)?;
            self.lifecycle
                .validate_transition(&booking.status, &BookingStatus::Cancelled)?;
            booking.status = BookingStatus::Cancelled;
            booking.last_transition_at = Utc::now();
            booking.clone()
        };

        info!("Booking {} cancelled", cancelled.booking_number);
        self.emit(BookingEvent::Cancelled(cancelled.clone()));

        Ok(cancelled)
    }

    /// Mark a Confirmed booking Completed. Driven by an external operational
    /// event (device picked up); no availability effect, no event emitted.
    pub async fn complete_booking(&self, booking_id: Uuid) -> Result<Booking, SchedulingError> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .get_mut(&booking_id)
            .ok_or(SchedulingError::NotFound)?;
        self.lifecycle
            .validate_transition(&booking.status, &BookingStatus::Completed)?;
        booking.status = BookingStatus::Completed;
        booking.last_transition_at = Utc::now();

        info!("Booking {} completed", booking.booking_number);
        Ok(booking.clone())
    }

    // ==========================================================================
    // READ OPERATIONS
    // ==========================================================================

    /// Candidate start times for a date with the technician benches still
    /// free at each. Read-only; safe to call concurrently with writers at
    /// the cost of a slightly stale snapshot.
    pub async fn list_availability(
        &self,
        date: NaiveDate,
        duration_minutes: Option<i32>,
    ) -> Result<Vec<SlotAvailability>, SchedulingError> {
        let duration = match duration_minutes {
            Some(minutes) if minutes <= 0 => {
                return Err(SchedulingError::InvalidRequest(
                    "duration_minutes must be positive".to_string(),
                ));
            }
            Some(minutes) => minutes,
            None => self.slots.granularity_minutes(),
        };

        let Some(open) = self.calendar.hours_for(date) else {
            return Ok(Vec::new());
        };

        let bookings = self.bookings.read().await;
        let entries = self
            .slots
            .slots_for(date)
            .into_iter()
            // Starts whose requested duration would cross closing are not
            // bookable, so they are not offered.
            .filter(|start| start + duration <= open.closes_at)
            .map(|start_minute| SlotAvailability {
                start_minute,
                time: format_minute(start_minute),
                remaining_capacity: remaining_capacity_in(
                    &bookings,
                    self.rules.capacity_per_slot,
                    date,
                    start_minute,
                    duration,
                ),
            })
            .collect();

        Ok(entries)
    }

    /// Remaining technician benches for one interval.
    pub async fn remaining_capacity(
        &self,
        date: NaiveDate,
        start_minute: i32,
        duration_minutes: i32,
    ) -> i32 {
        let bookings = self.bookings.read().await;
        remaining_capacity_in(
            &bookings,
            self.rules.capacity_per_slot,
            date,
            start_minute,
            duration_minutes,
        )
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, SchedulingError> {
        let bookings = self.bookings.read().await;
        bookings
            .get(&booking_id)
            .cloned()
            .ok_or(SchedulingError::NotFound)
    }

    /// Lookup by the customer-facing tracking code from the confirmation
    /// message.
    pub async fn find_by_tracking_code(&self, code: &str) -> Result<Booking, SchedulingError> {
        let bookings = self.bookings.read().await;
        bookings
            .values()
            .find(|booking| booking.tracking_code.eq_ignore_ascii_case(code))
            .cloned()
            .ok_or(SchedulingError::NotFound)
    }

    /// Filtered listing for the admin dashboard, ordered by date and start
    /// time.
    pub async fn search_bookings(&self, query: BookingSearchQuery) -> Vec<Booking> {
        let bookings = self.bookings.read().await;

        let mut results: Vec<Booking> = bookings
            .values()
            .filter(|booking| query.date.map_or(true, |date| booking.date == date))
            .filter(|booking| query.status.map_or(true, |status| booking.status == status))
            .cloned()
            .collect();

        results.sort_by_key(|booking| (booking.date, booking.start_minute, booking.created_at));

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        results.into_iter().skip(offset).take(limit).collect()
    }

    // ==========================================================================
    // PRIVATE HELPER METHODS
    // ==========================================================================

    fn validate_request(
        &self,
        request: &BookingRequest,
        duration: i32,
    ) -> Result<(), SchedulingError> {
        if let Some(minutes) = request.duration_minutes {
            if minutes <= 0 {
                return Err(SchedulingError::InvalidRequest(
                    "duration_minutes must be positive".to_string(),
                ));
            }
        }
        debug_assert!(duration > 0);

        if request.start_minute < 0 || request.start_minute >= MINUTES_PER_DAY {
            return Err(SchedulingError::InvalidRequest(format!(
                "start_minute {} is not a minute of day",
                request.start_minute
            )));
        }

        let today = Utc::now().date_naive();
        if request.date < today {
            return Err(SchedulingError::InvalidRequest(
                "Bookings cannot be made for past dates".to_string(),
            ));
        }

        let horizon = today + ChronoDuration::days(self.rules.max_advance_booking_days as i64);
        if request.date > horizon {
            return Err(SchedulingError::InvalidRequest(format!(
                "Bookings cannot be made more than {} days in advance",
                self.rules.max_advance_booking_days
            )));
        }

        Ok(())
    }

    async fn lock_for_date(&self, date: NaiveDate) -> Arc<Mutex<()>> {
        let mut locks = self.date_locks.lock().await;
        Arc::clone(locks.entry(date).or_insert_with(|| Arc::new(Mutex::new(()))))
    }

    fn emit(&self, event: BookingEvent) {
        // Notification delivery is the dispatcher's concern; an absent or
        // lagging subscriber never fails the booking.
        if self.events.send(event).is_err() {
            debug!("No event subscribers connected, dropping booking event");
        }
    }
}

/// `capacity` minus the Pending/Confirmed bookings overlapping the interval.
/// Two half-open intervals [a1, a2) and [b1, b2) overlap iff a1 < b2 && b1 < a2.
fn remaining_capacity_in(
    bookings: &HashMap<Uuid, Booking>,
    capacity: i32,
    date: NaiveDate,
    start_minute: i32,
    duration_minutes: i32,
) -> i32 {
    let occupied = bookings
        .values()
        .filter(|booking| booking.status.occupies_capacity())
        .filter(|booking| booking.overlaps(date, start_minute, duration_minutes))
        .count() as i32;

    if occupied > capacity {
        warn!(
            "Occupancy {} exceeds capacity {} on {} at {}",
            occupied, capacity, date, start_minute
        );
    }

    (capacity - occupied).max(0)
}

// ==============================================================================
// BOOKING IDENTIFIERS
// ==============================================================================

const BASE36_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Customer-facing booking number, e.g. `ME-SX3K9P-4QZA`.
fn generate_booking_number() -> String {
    format!(
        "ME-{}-{}",
        to_base36(Utc::now().timestamp()),
        random_base36(4)
    )
}

/// Short code printed on the receipt for the repair-tracking page.
fn generate_tracking_code() -> String {
    random_base36(8)
}

fn to_base36(mut value: i64) -> String {
    if value <= 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize] as char);
        value /= 36;
    }
    digits.iter().rev().collect()
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36_ALPHABET[rng.gen_range(0..36)] as char)
        .collect()
}
