use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::FlightFilter;
use crate::errors::AppError;
use crate::models::{normalize_flight_number, Flight, FlightStatus};
use crate::services::destinations;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct FlightsQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct FlightsResponse {
    pub flights: Vec<Flight>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct FlightResponse {
    #[serde(flatten)]
    pub flight: Flight,
    pub duration_minutes: i64,
}

fn place_filter(place: Option<&str>) -> Option<Vec<String>> {
    place
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| destinations::resolve(p).into_iter().collect())
}

// GET /api/flights
pub async fn list_flights(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FlightsQuery>,
) -> Result<Json<FlightsResponse>, AppError> {
    let status = match q.status.as_deref().map(|s| s.trim().to_lowercase()) {
        None => None,
        Some(s) if s.is_empty() => None,
        Some(s) => {
            let parsed = FlightStatus::parse(&s);
            if parsed.as_str() != s {
                return Err(AppError::BadRequest(format!("unknown flight status: {s}")));
            }
            Some(parsed)
        }
    };

    let filter = FlightFilter {
        origins: place_filter(q.origin.as_deref()),
        destinations: place_filter(q.destination.as_deref()),
        status,
    };
    let flights = state.flights.list(&filter)?;

    Ok(Json(FlightsResponse {
        count: flights.len(),
        flights,
    }))
}

// GET /api/flights/:flight_number
pub async fn get_flight(
    State(state): State<Arc<AppState>>,
    Path(flight_number): Path<String>,
) -> Result<Json<FlightResponse>, AppError> {
    let flight_number = normalize_flight_number(&flight_number);
    let flight = state
        .flights
        .find_by_number(&flight_number)?
        .ok_or_else(|| AppError::NotFound(format!("flight {flight_number}")))?;

    Ok(Json(FlightResponse {
        duration_minutes: flight.duration_minutes(),
        flight,
    }))
}
