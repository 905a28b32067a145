use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::BookingFilter;
use crate::errors::AppError;
use crate::models::{parse_confirmation_number, Booking, Caller, Flight};
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

#[derive(Deserialize)]
pub struct BookingsQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct BookingsResponse {
    pub bookings: Vec<Booking>,
    pub count: usize,
}

/// A booking with the flight it was made on. `flight` is null when the
/// flight has since been removed from the schedule.
#[derive(Serialize)]
pub struct BookingDetail {
    pub booking: Booking,
    pub flight: Option<Flight>,
}

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Query(q): Query<BookingsQuery>,
) -> Result<Json<BookingsResponse>, AppError> {
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let bookings = state
        .bookings
        .find_many(&BookingFilter::for_user(&caller.user_id), limit)?;

    Ok(Json(BookingsResponse {
        count: bookings.len(),
        bookings,
    }))
}

// GET /api/bookings/:confirmation
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(confirmation): Path<String>,
) -> Result<Json<BookingDetail>, AppError> {
    let code = parse_confirmation_number(&confirmation)
        .ok_or_else(|| AppError::BadRequest(format!("invalid confirmation number: {confirmation}")))?;

    let filter = BookingFilter::for_user(&caller.user_id).confirmation_number(&code);
    let booking = state
        .bookings
        .find_one(&filter)?
        .ok_or_else(|| AppError::NotFound(format!("booking {code}")))?;
    let flight = state.flights.find_by_number(&booking.flight_number)?;

    Ok(Json(BookingDetail { booking, flight }))
}
