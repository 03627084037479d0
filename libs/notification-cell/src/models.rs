// libs/notification-cell/src/models.rs
use serde::{Deserialize, Serialize};

use scheduling_cell::models::{format_minute, Booking};
use shared_config::AppConfig;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageChannel {
    Sms,
    Email,
}

/// A rendered message handed to a delivery channel. `recipient` is the
/// ledger's opaque customer reference; resolving it to a phone number or
/// address is the sender's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub channel: MessageChannel,
    pub recipient: String,
    pub subject: Option<String>,
    pub body: String,
}

/// Shop identity woven into every customer message.
#[derive(Debug, Clone)]
pub struct BusinessProfile {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub website: String,
}

impl From<&AppConfig> for BusinessProfile {
    fn from(config: &AppConfig) -> Self {
        Self {
            name: config.business_name.clone(),
            phone: config.business_phone.clone(),
            address: config.business_address.clone(),
            website: config.business_website.clone(),
        }
    }
}

impl BusinessProfile {
    pub fn confirmation_sms(&self, booking: &Booking) -> OutboundMessage {
        let body = format!(
            "Thanks for booking with {}!\n\n\
             Booking #: {}\n\
             Date: {}\n\
             Time: {}\n\n\
             {}\n\
             {}\n\n\
             Track your repair: {}/track?code={}\n\n\
             See you soon!",
            self.name,
            booking.booking_number,
            booking.date.format("%A, %B %-d, %Y"),
            format_minute(booking.start_minute),
            self.address,
            self.phone,
            self.website,
            booking.tracking_code,
        );

        OutboundMessage {
            channel: MessageChannel::Sms,
            recipient: booking.customer_ref.clone(),
            subject: None,
            body,
        }
    }

    pub fn confirmation_email(&self, booking: &Booking) -> OutboundMessage {
        let body = format!(
            "Your {} appointment at {} is confirmed for {} at {}.\n\n\
             Booking number: {}\n\
             Tracking code: {}\n\n\
             Find us at {}. Questions? Call {}.",
            booking.repair_type,
            self.name,
            booking.date.format("%A, %B %-d, %Y"),
            format_minute(booking.start_minute),
            booking.booking_number,
            booking.tracking_code,
            self.address,
            self.phone,
        );

        OutboundMessage {
            channel: MessageChannel::Email,
            recipient: booking.customer_ref.clone(),
            subject: Some(format!("Booking confirmed - {}", booking.booking_number)),
            body,
        }
    }

    pub fn cancellation_sms(&self, booking: &Booking) -> OutboundMessage {
        let body = format!(
            "Your booking {} at {} on {} at {} has been cancelled.\n\n\
             Need a new appointment? Call {} or visit {}.",
            booking.booking_number,
            self.name,
            booking.date.format("%A, %B %-d, %Y"),
            format_minute(booking.start_minute),
            self.phone,
            self.website,
        );

        OutboundMessage {
            channel: MessageChannel::Sms,
            recipient: booking.customer_ref.clone(),
            subject: None,
            body,
        }
    }
}
