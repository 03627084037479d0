// libs/notification-cell/tests/dispatcher_test.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use notification_cell::{
    BusinessProfile, MessageChannel, NotificationDispatcher, NotificationError,
    NotificationSender, OutboundMessage,
};
use scheduling_cell::models::{Booking, BookingEvent, BookingStatus, RepairType};

// ==============================================================================
// TEST FIXTURES AND UTILITIES
// ==============================================================================

#[derive(Clone, Default)]
struct RecordingSender {
    messages: Arc<Mutex<Vec<OutboundMessage>>>,
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotificationError> {
        self.messages.lock().await.push(message.clone());
        Ok(())
    }
}

fn test_profile() -> BusinessProfile {
    BusinessProfile {
        name: "Mobile Experts Inc".to_string(),
        phone: "(929) 789-2786".to_string(),
        address: "1134 Liberty Ave, Brooklyn, NY 11208".to_string(),
        website: "https://mobileexpertsbrooklyn.com".to_string(),
    }
}

fn test_booking() -> Booking {
    let now = Utc::now();
    Booking {
        id: Uuid::new_v4(),
        booking_number: "ME-TEST01-ABCD".to_string(),
        tracking_code: "TRACK123".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 6, 16).unwrap(),
        start_minute: 870, // 2:30 PM
        duration_minutes: 60,
        repair_type: RepairType::CrackedScreen,
        customer_ref: "cust-42".to_string(),
        status: BookingStatus::Confirmed,
        created_at: now,
        last_transition_at: now,
    }
}

// ==============================================================================
// DISPATCH TESTS
// ==============================================================================

#[tokio::test]
async fn confirmed_event_sends_sms_and_email() {
    let sender = RecordingSender::default();
    let dispatcher = NotificationDispatcher::new(test_profile(), Arc::new(sender.clone()));

    dispatcher
        .dispatch(BookingEvent::Confirmed(test_booking()))
        .await;

    let messages = sender.messages.lock().await;
    assert_eq!(messages.len(), 2);

    let sms = &messages[0];
    assert_eq!(sms.channel, MessageChannel::Sms);
    assert_eq!(sms.recipient, "cust-42");
    assert!(sms.body.contains("ME-TEST01-ABCD"));
    assert!(sms.body.contains("2:30 PM"));
    assert!(sms.body.contains("track?code=TRACK123"));

    let email = &messages[1];
    assert_eq!(email.channel, MessageChannel::Email);
    assert!(email.subject.as_deref().unwrap().contains("ME-TEST01-ABCD"));
    assert!(email.body.contains("cracked-screen"));
}

#[tokio::test]
async fn cancelled_event_sends_a_single_sms() {
    let sender = RecordingSender::default();
    let dispatcher = NotificationDispatcher::new(test_profile(), Arc::new(sender.clone()));

    let mut booking = test_booking();
    booking.status = BookingStatus::Cancelled;
    dispatcher.dispatch(BookingEvent::Cancelled(booking)).await;

    let messages = sender.messages.lock().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].channel, MessageChannel::Sms);
    assert!(messages[0].body.contains("cancelled"));
}

#[tokio::test]
async fn spawned_dispatcher_drains_events_until_the_channel_closes() {
    let sender = RecordingSender::default();
    let dispatcher = NotificationDispatcher::new(test_profile(), Arc::new(sender.clone()));

    let (tx, rx) = broadcast::channel(16);
    let handle = dispatcher.spawn(rx);

    tx.send(BookingEvent::Confirmed(test_booking())).unwrap();
    drop(tx);

    handle.await.unwrap();

    let messages = sender.messages.lock().await;
    assert_eq!(messages.len(), 2);
}
