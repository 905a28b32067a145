use chrono::NaiveDateTime;

use crate::models::{Booking, Flight};

pub fn datetime(ts: &NaiveDateTime) -> String {
    ts.format("%a %b %-d %Y %H:%M").to_string()
}

pub fn date(ts: &NaiveDateTime) -> String {
    ts.format("%a %b %-d %Y").to_string()
}

pub fn price(amount: f64) -> String {
    format!("${amount:.2}")
}

pub fn flight_details(flight: &Flight) -> String {
    format!(
        "Flight: {} {}\nRoute: {}\nDeparture: {}\nArrival: {}\nDuration: {}\nFlight Status: {}\nPrice: {}",
        flight.airline,
        flight.flight_number,
        flight.route_label(),
        datetime(&flight.departure_time),
        datetime(&flight.arrival_time),
        flight.duration_label(),
        flight.status.as_str().to_uppercase(),
        price(flight.price),
    )
}

pub fn booking_details(booking: &Booking) -> String {
    format!(
        "Confirmation Number: {}\nStatus: {}\nPassenger: {}\nEmail: {}\nTravel Date: {}",
        booking.confirmation_number,
        booking.status.as_str().to_uppercase(),
        booking.passenger_name,
        booking.passenger_email,
        date(&booking.travel_date),
    )
}

/// One line per suggested flight, numbered from 1.
pub fn suggestion_list(flights: &[Flight]) -> String {
    flights
        .iter()
        .enumerate()
        .map(|(i, f)| {
            format!(
                "{}. {} {} ({}) departs {}, {}, {}, {} seats left",
                i + 1,
                f.airline,
                f.flight_number,
                f.route_label(),
                datetime(&f.departure_time),
                f.duration_label(),
                price(f.price),
                f.available_seats,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_datetime_and_price() {
        let ts = NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();
        assert_eq!(datetime(&ts), "Mon Mar 3 2025 08:05");
        assert_eq!(date(&ts), "Mon Mar 3 2025");
        assert_eq!(price(299.0), "$299.00");
        assert_eq!(price(1234.5), "$1234.50");
    }
}
