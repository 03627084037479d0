// libs/scheduling-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_config::AppConfig;

pub const MINUTES_PER_DAY: i32 = 24 * 60;

// ==============================================================================
// OPERATING HOURS MODELS
// ==============================================================================

/// Weekly operating hours for one weekday. Minutes are minute-of-day in [0, 1440).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BusinessHours {
    pub opens_at: i32,
    pub closes_at: i32,
    pub is_closed: bool,
}

impl BusinessHours {
    pub fn open(opens_at: i32, closes_at: i32) -> Self {
        Self { opens_at, closes_at, is_closed: false }
    }

    pub fn closed() -> Self {
        Self { opens_at: 0, closes_at: 0, is_closed: true }
    }

    pub fn is_valid(&self) -> bool {
        self.is_closed
            || (self.opens_at < self.closes_at
                && self.opens_at >= 0
                && self.closes_at < MINUTES_PER_DAY)
    }
}

/// The open minute range for a specific date, after blackout overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenHours {
    pub opens_at: i32,
    pub closes_at: i32,
}

/// A calendar date with modified or fully closed hours overriding the weekly
/// default (holiday, inventory day, emergency closure).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackoutDate {
    pub date: NaiveDate,
    pub opens_at: Option<i32>,
    pub closes_at: Option<i32>,
    pub full_day: bool,
    pub reason: Option<String>,
}

impl BlackoutDate {
    pub fn full_day(date: NaiveDate, reason: Option<String>) -> Self {
        Self { date, opens_at: None, closes_at: None, full_day: true, reason }
    }

    pub fn shortened(date: NaiveDate, opens_at: i32, closes_at: i32) -> Self {
        Self {
            date,
            opens_at: Some(opens_at),
            closes_at: Some(closes_at),
            full_day: false,
            reason: None,
        }
    }
}

// ==============================================================================
// SLOT MODELS
// ==============================================================================

/// A candidate bookable unit, derived on demand and never persisted.
/// Identity is (date, start_minute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub start_minute: i32,
    pub duration_minutes: i32,
}

/// One availability entry as rendered to the booking UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub start_minute: i32,
    pub time: String,
    pub remaining_capacity: i32,
}

/// Render minute-of-day as the 12-hour label the storefront shows ("2:30 PM").
pub fn format_minute(minute: i32) -> String {
    let hour = minute / 60;
    let min = minute % 60;
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{}:{:02} {}", display_hour, min, period)
}

// ==============================================================================
// REPAIR CATALOG
// ==============================================================================

/// Walk-in repair categories from the service menu.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RepairType {
    CrackedScreen,
    BatteryReplacement,
    WaterDamage,
    ChargingPort,
    Camera,
    BackGlass,
    SpeakerMic,
    Other,
}

impl RepairType {
    /// Default bench-time estimate used when the caller does not supply an
    /// explicit duration.
    pub fn estimated_duration_minutes(&self) -> i32 {
        match self {
            RepairType::CrackedScreen => 60,
            RepairType::BatteryReplacement => 30,
            RepairType::WaterDamage => 120,
            RepairType::ChargingPort => 45,
            RepairType::Camera => 60,
            RepairType::BackGlass => 90,
            RepairType::SpeakerMic => 45,
            RepairType::Other => 30,
        }
    }
}

impl fmt::Display for RepairType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairType::CrackedScreen => write!(f, "cracked-screen"),
            RepairType::BatteryReplacement => write!(f, "battery-replacement"),
            RepairType::WaterDamage => write!(f, "water-damage"),
            RepairType::ChargingPort => write!(f, "charging-port"),
            RepairType::Camera => write!(f, "camera"),
            RepairType::BackGlass => write!(f, "back-glass"),
            RepairType::SpeakerMic => write!(f, "speaker-mic"),
            RepairType::Other => write!(f, "other"),
        }
    }
}

// ==============================================================================
// BOOKING MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub booking_number: String,
    pub tracking_code: String,
    pub date: NaiveDate,
    pub start_minute: i32,
    pub duration_minutes: i32,
    pub repair_type: RepairType,
    pub customer_ref: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub last_transition_at: DateTime<Utc>,
}

impl Booking {
    pub fn end_minute(&self) -> i32 {
        self.start_minute + self.duration_minutes
    }

    /// Does this booking occupy [start, start + duration) on the given date?
    pub fn overlaps(&self, date: NaiveDate, start_minute: i32, duration_minutes: i32) -> bool {
        self.date == date
            && self.start_minute < start_minute + duration_minutes
            && start_minute < self.end_minute()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Pending and Confirmed bookings hold a technician slot; terminal
    /// statuses release it.
    pub fn occupies_capacity(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST/QUERY MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub date: NaiveDate,
    pub start_minute: i32,
    /// Defaults to the repair type's bench-time estimate when absent.
    pub duration_minutes: Option<i32>,
    pub repair_type: RepairType,
    pub customer_ref: String,
}

impl BookingRequest {
    pub fn effective_duration(&self) -> i32 {
        match self.duration_minutes {
            Some(minutes) if minutes > 0 => minutes,
            _ => self.repair_type.estimated_duration_minutes(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingSearchQuery {
    pub date: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// ==============================================================================
// SCHEDULING RULES
// ==============================================================================

#[derive(Debug, Clone)]
pub struct SchedulingRules {
    /// Concurrent technician benches per overlapping interval.
    pub capacity_per_slot: i32,
    pub granularity_minutes: i32,
    pub max_advance_booking_days: i32,
}

impl Default for SchedulingRules {
    fn default() -> Self {
        Self {
            capacity_per_slot: 2,
            granularity_minutes: 30,
            max_advance_booking_days: 90,
        }
    }
}

impl From<&AppConfig> for SchedulingRules {
    fn from(config: &AppConfig) -> Self {
        Self {
            capacity_per_slot: config.capacity_per_slot,
            granularity_minutes: config.granularity_minutes,
            max_advance_booking_days: config.max_advance_booking_days,
        }
    }
}

// ==============================================================================
// LIFECYCLE EVENTS
// ==============================================================================

/// Emitted by the ledger for the notification collaborator. Carries the full
/// booking record so consumers never have to read the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "booking", rename_all = "snake_case")]
pub enum BookingEvent {
    Confirmed(Booking),
    Cancelled(Booking),
}

impl BookingEvent {
    pub fn booking(&self) -> &Booking {
        match self {
            BookingEvent::Confirmed(booking) | BookingEvent::Cancelled(booking) => booking,
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum SchedulingError {
    #[error("Invalid booking request: {0}")]
    InvalidRequest(String),

    #[error("Requested time is outside operating hours")]
    OutOfHours,

    #[error("All technician slots are taken for the requested time")]
    SlotFull,

    #[error("Booking not found")]
    NotFound,

    #[error("Booking cannot be modified in current status: {0}")]
    InvalidTransition(BookingStatus),

    #[error("Booking storage unavailable: {0}")]
    StorageUnavailable(String),
}
