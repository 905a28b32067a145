use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AVAILABLE_SEATS: i64 = 180;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flight {
    pub flight_number: String,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub status: FlightStatus,
    pub price: f64,
    pub available_seats: i64,
}

impl Flight {
    pub fn duration_minutes(&self) -> i64 {
        (self.arrival_time - self.departure_time).num_minutes()
    }

    /// "2h 35m" style rendering of the scheduled block time.
    pub fn duration_label(&self) -> String {
        let minutes = self.duration_minutes().max(0);
        match (minutes / 60, minutes % 60) {
            (0, m) => format!("{m}m"),
            (h, 0) => format!("{h}h"),
            (h, m) => format!("{h}h {m}m"),
        }
    }

    pub fn route_label(&self) -> String {
        format!("{} -> {}", self.origin, self.destination)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FlightStatus {
    OnTime,
    Delayed,
    Cancelled,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::OnTime => "on-time",
            FlightStatus::Delayed => "delayed",
            FlightStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "delayed" => FlightStatus::Delayed,
            "cancelled" => FlightStatus::Cancelled,
            _ => FlightStatus::OnTime,
        }
    }
}

/// Flight numbers are stored trimmed and uppercased.
pub fn normalize_flight_number(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn flight(dep: (u32, u32), arr: (u32, u32)) -> Flight {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        Flight {
            flight_number: "AA101".to_string(),
            airline: "American Airlines".to_string(),
            origin: "LAX".to_string(),
            destination: "JFK".to_string(),
            departure_time: day.and_hms_opt(dep.0, dep.1, 0).unwrap(),
            arrival_time: day.and_hms_opt(arr.0, arr.1, 0).unwrap(),
            status: FlightStatus::OnTime,
            price: 299.0,
            available_seats: DEFAULT_AVAILABLE_SEATS,
        }
    }

    #[test]
    fn test_duration_minutes() {
        let f = flight((8, 0), (16, 35));
        assert_eq!(f.duration_minutes(), 515);
        assert_eq!(f.duration_label(), "8h 35m");
    }

    #[test]
    fn test_duration_label_whole_hours_and_short_hops() {
        assert_eq!(flight((8, 0), (10, 0)).duration_label(), "2h");
        assert_eq!(flight((8, 0), (8, 45)).duration_label(), "45m");
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [FlightStatus::OnTime, FlightStatus::Delayed, FlightStatus::Cancelled] {
            assert_eq!(FlightStatus::parse(status.as_str()), status);
        }
        assert_eq!(
            serde_json::to_string(&FlightStatus::OnTime).unwrap(),
            "\"on-time\""
        );
    }

    #[test]
    fn test_normalize_flight_number() {
        assert_eq!(normalize_flight_number("  aa101 "), "AA101");
    }
}
