// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{BookingRequest, BookingSearchQuery, BookingStatus, SchedulingError};
use crate::services::ledger::BookingLedger;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailabilityQueryParams {
    pub date: NaiveDate,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct BookingQueryParams {
    pub date: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

/// Bookable start times for a date, with remaining technician capacity.
#[axum::debug_handler]
pub async fn list_availability(
    State(ledger): State<Arc<BookingLedger>>,
    Query(params): Query<AvailabilityQueryParams>,
) -> Result<Json<Value>, AppError> {
    let slots = ledger
        .list_availability(params.date, params.duration_minutes)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "date": params.date,
        "slots": slots,
    })))
}

/// Book a repair appointment.
#[axum::debug_handler]
pub async fn book_repair(
    State(ledger): State<Arc<BookingLedger>>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<Value>, AppError> {
    let booking = ledger
        .request_booking(request)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "message": "Booking confirmed successfully",
    })))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(ledger): State<Arc<BookingLedger>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking = ledger
        .get_booking(booking_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({ "booking": booking })))
}

/// Repair-status lookup by the tracking code from the confirmation message.
#[axum::debug_handler]
pub async fn track_booking(
    State(ledger): State<Arc<BookingLedger>>,
    Path(tracking_code): Path<String>,
) -> Result<Json<Value>, AppError> {
    let booking = ledger
        .find_by_tracking_code(&tracking_code)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "booking_number": booking.booking_number,
        "status": booking.status,
        "date": booking.date,
        "time": crate::models::format_minute(booking.start_minute),
        "repair_type": booking.repair_type,
    })))
}

/// Admin listing with date/status filters.
#[axum::debug_handler]
pub async fn search_bookings(
    State(ledger): State<Arc<BookingLedger>>,
    Query(params): Query<BookingQueryParams>,
) -> Result<Json<Value>, AppError> {
    let query = BookingSearchQuery {
        date: params.date,
        status: params.status,
        limit: params.limit,
        offset: params.offset,
    };

    let bookings = ledger.search_bookings(query).await;

    Ok(Json(json!({
        "count": bookings.len(),
        "bookings": bookings,
    })))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(ledger): State<Arc<BookingLedger>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking = ledger
        .cancel_booking(booking_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "message": "Booking cancelled",
    })))
}

#[axum::debug_handler]
pub async fn complete_booking(
    State(ledger): State<Arc<BookingLedger>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking = ledger
        .complete_booking(booking_id)
        .await
        .map_err(map_scheduling_error)?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "message": "Booking marked completed",
    })))
}

// ==============================================================================
// ERROR MAPPING
// ==============================================================================

fn map_scheduling_error(err: SchedulingError) -> AppError {
    match err {
        SchedulingError::InvalidRequest(msg) => AppError::BadRequest(msg),
        SchedulingError::OutOfHours => {
            AppError::BadRequest("Requested time is outside operating hours".to_string())
        }
        SchedulingError::SlotFull => {
            AppError::Conflict("Time slot is no longer available, pick another slot".to_string())
        }
        SchedulingError::NotFound => AppError::NotFound("Booking not found".to_string()),
        SchedulingError::InvalidTransition(status) => {
            AppError::Conflict(format!("Booking is already {}", status))
        }
        SchedulingError::StorageUnavailable(msg) => AppError::Unavailable(msg),
    }
}
