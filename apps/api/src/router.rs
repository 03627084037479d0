use std::sync::Arc;

use axum::{routing::get, Router};

use scheduling_cell::{scheduling_routes, BookingLedger};

pub fn create_router(ledger: Arc<BookingLedger>) -> Router {
    Router::new()
        .route("/", get(|| async { "Mobile Experts booking API is running!" }))
        .nest("/bookings", scheduling_routes(ledger))
}
