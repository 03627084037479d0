// libs/notification-cell/src/services/dispatcher.rs
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use scheduling_cell::models::BookingEvent;

use crate::error::NotificationError;
use crate::models::{BusinessProfile, OutboundMessage};

/// Delivery seam. The shipped implementation logs; a real SMS/email gateway
/// plugs in behind the same trait.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotificationError>;
}

pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotificationError> {
        info!(
            "Delivering {:?} notification to {}: {:?}",
            message.channel, message.recipient, message.subject
        );
        debug!("Notification body:\n{}", message.body);
        Ok(())
    }
}

/// Consumes booking lifecycle events from the ledger's broadcast channel and
/// renders/delivers customer notifications. Fire-and-forget from the
/// ledger's perspective: delivery failures are logged here and never reach
/// the booking path.
pub struct NotificationDispatcher {
    profile: BusinessProfile,
    sender: Arc<dyn NotificationSender>,
}

impl NotificationDispatcher {
    pub fn new(profile: BusinessProfile, sender: Arc<dyn NotificationSender>) -> Self {
        Self { profile, sender }
    }

    /// Run the dispatcher on its own task until the event channel closes.
    pub fn spawn(self, mut events: broadcast::Receiver<BookingEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Notification dispatcher started");
            loop {
                match events.recv().await {
                    Ok(event) => self.dispatch(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Notification dispatcher lagged, {} events dropped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Booking event channel closed, dispatcher stopping");
                        break;
                    }
                }
            }
        })
    }

    pub async fn dispatch(&self, event: BookingEvent) {
        let messages = self.render(&event);
        let booking_number = event.booking().booking_number.clone();

        for message in messages {
            if let Err(err) = self.sender.send(&message).await {
                warn!(
                    "Failed to deliver {:?} notification for booking {}: {}",
                    message.channel, booking_number, err
                );
            }
        }
    }

    fn render(&self, event: &BookingEvent) -> Vec<OutboundMessage> {
        match event {
            BookingEvent::Confirmed(booking) => vec![
                self.profile.confirmation_sms(booking),
                self.profile.confirmation_email(booking),
            ],
            BookingEvent::Cancelled(booking) => vec![self.profile.cancellation_sms(booking)],
        }
    }
}
