use std::sync::Arc;

use crate::db::{BookingFilter, BookingStore, FlightSearch, FlightStore};
use crate::errors::StoreError;
use crate::models::{BookingStatus, Caller, ExtractedFields, Field, Flight, FlightStatus, IntentKind, NewBooking};
use crate::services::ai::extract::FieldExtractor;
use crate::services::{destinations, format, AgentReply};

pub const SUGGESTION_LIMIT: usize = 5;

const NEED_FLIGHT_OR_DESTINATION: &str = "I can book a flight for you in two ways:

1. Give me a flight number and passenger name, e.g. \"Book flight AA101 for John Doe\"
2. Tell me where you want to go, e.g. \"Book a flight to New York for Jane Smith\", and I'll suggest flights";

const BOOKING_ERROR: &str =
    "Sorry, there was an error processing your booking. Please try again in a moment.";

pub struct BookingHandler {
    extractor: Arc<FieldExtractor>,
    flights: Arc<dyn FlightStore>,
    bookings: Arc<dyn BookingStore>,
}

impl BookingHandler {
    pub fn new(
        extractor: Arc<FieldExtractor>,
        flights: Arc<dyn FlightStore>,
        bookings: Arc<dyn BookingStore>,
    ) -> Self {
        Self {
            extractor,
            flights,
            bookings,
        }
    }

    pub async fn book(&self, message: &str, caller: &Caller) -> AgentReply {
        let fields = self.extractor.extract(IntentKind::Booking, message).await;

        match self.book_with(&fields, caller) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, user_id = %caller.user_id, "booking failed");
                AgentReply::failure(BOOKING_ERROR)
            }
        }
    }

    fn book_with(&self, fields: &ExtractedFields, caller: &Caller) -> anyhow::Result<AgentReply> {
        let flight_number = match &fields.flight_number {
            Field::Present(number) => number,
            missing => {
                if let Some(destination) = fields.destination.present() {
                    return self.suggest_flights(destination, fields.origin.present().map(String::as_str));
                }
                return Ok(match missing {
                    Field::Invalid(raw) => AgentReply::failure(format!(
                        "\"{raw}\" doesn't look like a flight number (they look like AA101).\n\n{NEED_FLIGHT_OR_DESTINATION}"
                    )),
                    _ => AgentReply::failure(NEED_FLIGHT_OR_DESTINATION),
                });
            }
        };

        let Some(passenger_name) = fields.passenger_name.present() else {
            return Ok(AgentReply::failure(format!(
                "Who is travelling? Please include the passenger name, e.g. \"Book flight {flight_number} for John Doe\"."
            )));
        };

        let Some(flight) = self.flights.find_by_number(flight_number)? else {
            tracing::info!(flight_number = %flight_number, "booking requested for unknown flight");
            return Ok(AgentReply::failure(format!(
                "Flight {flight_number} not found. Please check the flight number, or tell me where you want to go \
                 (e.g. \"Book a flight to New York for {passenger_name}\") and I'll suggest available flights."
            )));
        };

        if flight.status == FlightStatus::Cancelled {
            return Ok(unavailable(&flight, passenger_name, "has been cancelled"));
        }
        if flight.available_seats <= 0 {
            return Ok(unavailable(&flight, passenger_name, "is fully booked"));
        }

        let active = BookingFilter::for_user(&caller.user_id)
            .flight_number(flight_number)
            .status(BookingStatus::Confirmed);
        if let Some(existing) = self.bookings.find_one(&active)? {
            tracing::info!(
                user_id = %caller.user_id,
                flight_number = %flight_number,
                confirmation = %existing.confirmation_number,
                "duplicate booking refused"
            );
            return Ok(duplicate(flight_number, &existing.confirmation_number));
        }

        let passenger_email = match &fields.passenger_email {
            Field::Present(email) => email.clone(),
            Field::Invalid(raw) => {
                return Ok(AgentReply::failure(format!(
                    "\"{raw}\" doesn't look like a valid email address. Please check it, or leave it out to use your account email."
                )));
            }
            Field::Absent => caller.email.trim().to_lowercase(),
        };

        let travel_date = match &fields.travel_date {
            Field::Present(date) => *date,
            Field::Invalid(raw) => {
                tracing::warn!(travel_date = %raw, "unreadable travel date, using scheduled departure");
                flight.departure_time
            }
            Field::Absent => flight.departure_time,
        };

        let new_booking = NewBooking {
            user_id: caller.user_id.clone(),
            flight_number: flight_number.clone(),
            passenger_name: passenger_name.clone(),
            passenger_email,
            travel_date,
        };

        let booking = match self.bookings.create(new_booking) {
            Ok(booking) => booking,
            Err(StoreError::DuplicateBooking { .. }) => {
                // lost a race with a concurrent request for the same flight
                let existing = self.bookings.find_one(&active)?;
                let code = existing
                    .map(|b| b.confirmation_number)
                    .unwrap_or_else(|| "on file".to_string());
                return Ok(duplicate(flight_number, &code));
            }
            Err(StoreError::SoldOut { .. }) => {
                return Ok(unavailable(&flight, passenger_name, "is fully booked"));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            user_id = %caller.user_id,
            flight_number = %flight_number,
            confirmation = %booking.confirmation_number,
            "booking created"
        );

        let message = format!(
            "Booking confirmed!\n\n\
             Flight: {} {}\n\
             Route: {}\n\
             Departure: {}\n\
             Arrival: {}\n\
             Duration: {}\n\
             Price: {}\n\
             Passenger: {}\n\
             Confirmation Number: {}\n\n\
             Save your confirmation number for future reference.",
            flight.airline,
            flight.flight_number,
            flight.route_label(),
            format::datetime(&flight.departure_time),
            format::datetime(&flight.arrival_time),
            flight.duration_label(),
            format::price(flight.price),
            booking.passenger_name,
            booking.confirmation_number,
        );

        Ok(AgentReply::success(message).with_booking(booking))
    }

    /// Terminal reply listing bookable flights to `destination`; never books.
    fn suggest_flights(&self, destination: &str, origin: Option<&str>) -> anyhow::Result<AgentReply> {
        let search = FlightSearch {
            destinations: destinations::resolve(destination).into_iter().collect(),
            origins: origin
                .map(|o| destinations::resolve(o).into_iter().collect())
                .unwrap_or_default(),
            exclude_cancelled: true,
            min_available_seats: 1,
            limit: SUGGESTION_LIMIT,
        };
        let flights = self.flights.search(&search)?;

        tracing::info!(
            destination = %destination,
            candidates = ?search.destinations,
            found = flights.len(),
            "suggesting flights"
        );

        let route = match origin {
            Some(o) => format!("from {o} to {destination}"),
            None => format!("to {destination}"),
        };

        if flights.is_empty() {
            return Ok(AgentReply::failure(format!(
                "Sorry, I couldn't find any available flights {route}.\n\n\
                 Here are the destinations we serve: {}.\n\n\
                 Try one of those, or give me a flight number directly.",
                destinations::served_cities().join(", ")
            )));
        }

        Ok(AgentReply::failure(format!(
            "Here are the next available flights {route}:\n\n{}\n\n\
             To book one, reply with the flight number and passenger name, e.g. \"Book flight {} for Jane Smith\".",
            format::suggestion_list(&flights),
            flights[0].flight_number,
        )))
    }
}

fn duplicate(flight_number: &str, confirmation: &str) -> AgentReply {
    AgentReply::failure(format!(
        "You already have a confirmed booking for flight {flight_number} (Confirmation: {confirmation}). \
         If you want to make changes, please cancel the existing booking first."
    ))
}

fn unavailable(flight: &Flight, passenger_name: &str, reason: &str) -> AgentReply {
    AgentReply::failure(format!(
        "Sorry, flight {} ({}) {reason}. I can look for another flight to {}, just say \
         \"Book a flight to {} for {passenger_name}\".",
        flight.flight_number,
        flight.route_label(),
        flight.destination,
        flight.destination,
    ))
}
