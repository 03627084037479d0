use std::env;

use chrono::NaiveDate;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub capacity_per_slot: i32,
    pub granularity_minutes: i32,
    pub max_advance_booking_days: i32,
    pub blackout_dates: Vec<NaiveDate>,
    pub business_name: String,
    pub business_phone: String,
    pub business_address: String,
    pub business_website: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            capacity_per_slot: parse_env_i32("CAPACITY_PER_SLOT", 2),
            granularity_minutes: parse_env_i32("SLOT_GRANULARITY_MINUTES", 30),
            max_advance_booking_days: parse_env_i32("MAX_ADVANCE_BOOKING_DAYS", 90),
            blackout_dates: parse_blackout_dates(),
            business_name: env::var("BUSINESS_NAME")
                .unwrap_or_else(|_| "Mobile Experts Inc".to_string()),
            business_phone: env::var("BUSINESS_PHONE")
                .unwrap_or_else(|_| "(929) 789-2786".to_string()),
            business_address: env::var("BUSINESS_ADDRESS")
                .unwrap_or_else(|_| "1134 Liberty Ave, Brooklyn, NY 11208".to_string()),
            business_website: env::var("BUSINESS_WEBSITE")
                .unwrap_or_else(|_| "https://mobileexpertsbrooklyn.com".to_string()),
        }
    }
}

fn parse_env_i32(key: &str, default: i32) -> i32 {
    match env::var(key) {
        Ok(raw) => match raw.parse::<i32>() {
            Ok(value) if value > 0 => value,
            _ => {
                warn!("{} has invalid value {:?}, using default {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

/// BLACKOUT_DATES is a comma-separated list of YYYY-MM-DD full-day closures.
fn parse_blackout_dates() -> Vec<NaiveDate> {
    let Ok(raw) = env::var("BLACKOUT_DATES") else {
        return Vec::new();
    };

    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match NaiveDate::parse_from_str(entry, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                warn!("BLACKOUT_DATES entry {:?} is not a valid date, skipping", entry);
                None
            }
        })
        .collect()
}
