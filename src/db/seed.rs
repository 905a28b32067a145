use chrono::{Duration, NaiveDateTime, Utc};

use crate::db::store::{FlightFilter, FlightStore};
use crate::models::flight::DEFAULT_AVAILABLE_SEATS;
use crate::models::{Flight, FlightStatus};

// flight number, airline, origin, destination, days out, departure hour, block minutes, price
const DEMO_SCHEDULE: &[(&str, &str, &str, &str, i64, u32, i64, f64)] = &[
    ("AA101", "American Airlines", "LAX", "JFK", 3, 8, 330, 299.0),
    ("AA205", "American Airlines", "ORD", "LGA", 4, 13, 135, 189.0),
    ("UA245", "United Airlines", "SFO", "EWR", 2, 7, 335, 329.0),
    ("DL330", "Delta Air Lines", "ATL", "LAX", 5, 10, 290, 259.0),
    ("DL412", "Delta Air Lines", "JFK", "SFO", 6, 16, 380, 349.0),
    ("B6615", "JetBlue", "BOS", "MCO", 3, 9, 170, 149.0),
    ("WN822", "Southwest Airlines", "DAL", "MDW", 2, 18, 140, 129.0),
    ("AS190", "Alaska Airlines", "SEA", "SAN", 7, 11, 165, 139.0),
    ("BA178", "British Airways", "JFK", "LHR", 8, 19, 415, 689.0),
    ("AF023", "Air France", "JFK", "CDG", 9, 17, 440, 719.0),
];

fn departure(days_out: i64, hour: u32) -> Option<NaiveDateTime> {
    (Utc::now() + Duration::days(days_out))
        .date_naive()
        .and_hms_opt(hour, 0, 0)
}

pub fn demo_flights() -> Vec<Flight> {
    DEMO_SCHEDULE
        .iter()
        .filter_map(
            |&(number, airline, origin, destination, days_out, hour, minutes, price)| {
                let departure_time = departure(days_out, hour)?;
                Some(Flight {
                    flight_number: number.to_string(),
                    airline: airline.to_string(),
                    origin: origin.to_string(),
                    destination: destination.to_string(),
                    departure_time,
                    arrival_time: departure_time + Duration::minutes(minutes),
                    status: FlightStatus::OnTime,
                    price,
                    available_seats: DEFAULT_AVAILABLE_SEATS,
                })
            },
        )
        .collect()
}

/// Loads the demo schedule into an empty flights table. Returns how many
/// flights were written.
pub fn seed_demo_flights(store: &dyn FlightStore) -> anyhow::Result<usize> {
    if !store.list(&FlightFilter::default())?.is_empty() {
        tracing::info!("flights table not empty, skipping demo seed");
        return Ok(0);
    }

    let flights = demo_flights();
    for flight in &flights {
        store.upsert(flight)?;
    }
    tracing::info!(count = flights.len(), "seeded demo flights");
    Ok(flights.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;

    #[test]
    fn test_seed_only_fills_empty_table() {
        let store = SqliteStore::open(":memory:").unwrap();
        assert_eq!(seed_demo_flights(&store).unwrap(), DEMO_SCHEDULE.len());
        assert_eq!(seed_demo_flights(&store).unwrap(), 0);
        assert!(store.find_by_number("AA101").unwrap().is_some());
    }
}
