use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Unsupported channel for recipient {0}")]
    UnsupportedChannel(String),
}
