use std::sync::Arc;

use crate::db::{BookingStore, FlightStore};
use crate::services::orchestrator::Orchestrator;

pub struct AppState {
    pub orchestrator: Orchestrator,
    pub flights: Arc<dyn FlightStore>,
    pub bookings: Arc<dyn BookingStore>,
}
