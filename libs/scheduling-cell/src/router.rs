// libs/scheduling-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::services::ledger::BookingLedger;

pub fn scheduling_routes(ledger: Arc<BookingLedger>) -> Router {
    Router::new()
        .route("/", post(handlers::book_repair))
        .route("/availability", get(handlers::list_availability))
        .route("/search", get(handlers::search_bookings))
        .route("/track/{tracking_code}", get(handlers::track_booking))
        .route("/{booking_id}", get(handlers::get_booking))
        .route("/{booking_id}/cancel", post(handlers::cancel_booking))
        .route("/{booking_id}/complete", post(handlers::complete_booking))
        .with_state(ledger)
}
