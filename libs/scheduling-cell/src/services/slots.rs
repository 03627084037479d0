// libs/scheduling-cell/src/services/slots.rs
use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::Slot;
use crate::services::calendar::BusinessCalendar;

/// Converts a calendar date's open hours into the ordered sequence of
/// bookable start minutes at a fixed granularity.
pub struct SlotGenerator {
    calendar: Arc<BusinessCalendar>,
    granularity_minutes: i32,
}

impl SlotGenerator {
    pub fn new(calendar: Arc<BusinessCalendar>, granularity_minutes: i32) -> Self {
        Self { calendar, granularity_minutes }
    }

    pub fn granularity_minutes(&self) -> i32 {
        self.granularity_minutes
    }

    /// Start minutes `opens_at, opens_at + g, ...` while the full slot still
    /// fits before closing. A trailing partial period is dropped; closed
    /// dates yield an empty sequence.
    pub fn slots_for(&self, date: NaiveDate) -> Vec<i32> {
        let Some(open) = self.calendar.hours_for(date) else {
            return Vec::new();
        };

        let mut starts = Vec::new();
        let mut start = open.opens_at;
        while start + self.granularity_minutes <= open.closes_at {
            starts.push(start);
            start += self.granularity_minutes;
        }

        starts
    }

    /// Same enumeration, materialized as slots for callers that want the
    /// duration attached.
    pub fn slot_records_for(&self, date: NaiveDate) -> Vec<Slot> {
        self.slots_for(date)
            .into_iter()
            .map(|start_minute| Slot {
                date,
                start_minute,
                duration_minutes: self.granularity_minutes,
            })
            .collect()
    }
}
