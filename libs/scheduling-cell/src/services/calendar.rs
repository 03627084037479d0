// libs/scheduling-cell/src/services/calendar.rs
use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::models::{BlackoutDate, BusinessHours, OpenHours, SchedulingError};

/// Weekly operating-hours table plus per-date blackout overrides.
///
/// Loaded once at startup and treated as read-only for the process lifetime.
#[derive(Debug)]
pub struct BusinessCalendar {
    weekly: [BusinessHours; 7],
    blackouts: HashMap<NaiveDate, BlackoutDate>,
}

impl BusinessCalendar {
    pub fn new(
        weekly: [BusinessHours; 7],
        blackouts: Vec<BlackoutDate>,
    ) -> Result<Self, SchedulingError> {
        for (day, hours) in weekly.iter().enumerate() {
            if !hours.is_valid() {
                return Err(SchedulingError::InvalidRequest(format!(
                    "Operating hours for weekday {} are invalid: {}..{}",
                    day, hours.opens_at, hours.closes_at
                )));
            }
        }

        let blackouts = blackouts
            .into_iter()
            .map(|blackout| (blackout.date, blackout))
            .collect();

        Ok(Self { weekly, blackouts })
    }

    /// The shop's published storefront hours: Sunday 10:00-19:00, every other
    /// day 09:00-21:00.
    pub fn storefront_default(blackouts: Vec<BlackoutDate>) -> Result<Self, SchedulingError> {
        let weekday = BusinessHours::open(9 * 60, 21 * 60);
        let weekly = [
            BusinessHours::open(10 * 60, 19 * 60), // Sunday
            weekday,
            weekday,
            weekday,
            weekday,
            weekday,
            weekday,
        ];
        Self::new(weekly, blackouts)
    }

    /// Resolve the open minute range for a date, `None` meaning closed.
    ///
    /// A full-day blackout closes the date outright; a partial blackout
    /// narrows the weekday range, and an empty or inverted result closes it.
    /// Dates far in the past or future are answered from the weekday rule
    /// alone; range validation is the caller's concern.
    pub fn hours_for(&self, date: NaiveDate) -> Option<OpenHours> {
        let hours = self.weekly[day_of_week(date)];
        if hours.is_closed {
            return None;
        }

        let mut open = OpenHours {
            opens_at: hours.opens_at,
            closes_at: hours.closes_at,
        };

        if let Some(blackout) = self.blackouts.get(&date) {
            if blackout.full_day {
                debug!("Date {} is fully blacked out ({:?})", date, blackout.reason);
                return None;
            }
            if let Some(opens_at) = blackout.opens_at {
                open.opens_at = open.opens_at.max(opens_at);
            }
            if let Some(closes_at) = blackout.closes_at {
                open.closes_at = open.closes_at.min(closes_at);
            }
            if open.opens_at >= open.closes_at {
                debug!("Blackout override for {} leaves no open window", date);
                return None;
            }
        }

        Some(open)
    }
}

/// 0 = Sunday through 6 = Saturday, matching the weekly table layout.
fn day_of_week(date: NaiveDate) -> usize {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}
