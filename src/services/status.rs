use std::sync::Arc;

use crate::db::{BookingFilter, BookingStore, FlightStore};
use crate::models::{BookingStatus, Caller, ExtractedFields, Field, IntentKind};
use crate::services::ai::extract::FieldExtractor;
use crate::services::{format, AgentReply};

const RECENT_BOOKINGS_LIMIT: usize = 5;

const STATUS_ERROR: &str = "Sorry, I couldn't check that right now. Please try again in a moment.";

pub struct StatusHandler {
    extractor: Arc<FieldExtractor>,
    flights: Arc<dyn FlightStore>,
    bookings: Arc<dyn BookingStore>,
}

impl StatusHandler {
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

    pub async fn status(&self, message: &str, caller: &Caller) -> AgentReply {
        let fields = self.extractor.extract(IntentKind::Status, message).await;

        match self.status_with(&fields, caller) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, user_id = %caller.user_id, "status check failed");
                AgentReply::failure(STATUS_ERROR)
            }
        }
    }

    fn status_with(&self, fields: &ExtractedFields, caller: &Caller) -> anyhow::Result<AgentReply> {
        if let Field::Present(code) = &fields.confirmation_number {
            return self.by_confirmation(code, caller);
        }
        if let Field::Present(number) = &fields.flight_number {
            return self.by_flight(number, caller);
        }

        if let Field::Invalid(raw) = &fields.confirmation_number {
            return Ok(AgentReply::failure(format!(
                "\"{raw}\" doesn't look like a confirmation number. They look like BK-ABC123."
            )));
        }
        if let Field::Invalid(raw) = &fields.flight_number {
            return Ok(AgentReply::failure(format!(
                "\"{raw}\" doesn't look like a flight number. They look like AA101."
            )));
        }

        self.recent_bookings(caller)
    }

    fn by_confirmation(&self, code: &str, caller: &Caller) -> anyhow::Result<AgentReply> {
        let filter = BookingFilter::for_user(&caller.user_id).confirmation_number(code);
        let Some(booking) = self.bookings.find_one(&filter)? else {
            return Ok(AgentReply::failure(format!(
                "Booking {code} not found. Please check the confirmation number."
            )));
        };

        let flight = match self.flights.find_by_number(&booking.flight_number)? {
            Some(flight) => format::flight_details(&flight),
            None => format!(
                "Flight: {}\nNote: details for this flight are no longer available.",
                booking.flight_number
            ),
        };

        Ok(AgentReply::success(format!(
            "Booking details:\n\n{}\n\n{flight}",
            format::booking_details(&booking)
        )))
    }

    fn by_flight(&self, flight_number: &str, caller: &Caller) -> anyhow::Result<AgentReply> {
        let Some(flight) = self.flights.find_by_number(flight_number)? else {
            return Ok(AgentReply::failure(format!(
                "Flight {flight_number} not found. Please check the flight number."
            )));
        };

        let mut message = format!("Flight information:\n\n{}", format::flight_details(&flight));

        let mine = BookingFilter::for_user(&caller.user_id)
            .flight_number(flight_number)
            .status(BookingStatus::Confirmed);
        if let Some(booking) = self.bookings.find_one(&mine)? {
            message.push_str("\n\nYour booking on this flight:\n");
            message.push_str(&format::booking_details(&booking));
        }

        Ok(AgentReply::success(message))
    }

    fn recent_bookings(&self, caller: &Caller) -> anyhow::Result<AgentReply> {
        let filter = BookingFilter::for_user(&caller.user_id).status(BookingStatus::Confirmed);
        let bookings = self.bookings.find_many(&filter, RECENT_BOOKINGS_LIMIT)?;

        if bookings.is_empty() {
            return Ok(AgentReply::failure(
                "You don't have any confirmed bookings. If you have a confirmation number \
                 (e.g. BK-ABC123), tell me and I'll look it up.",
            ));
        }

        let lines = bookings
            .iter()
            .enumerate()
            .map(|(i, b)| {
                format!(
                    "{}. {} - flight {} for {} on {}",
                    i + 1,
                    b.confirmation_number,
                    b.flight_number,
                    b.passenger_name,
                    format::date(&b.travel_date),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(AgentReply::success(format!(
            "Your confirmed bookings:\n\n{lines}\n\nAsk about a confirmation number for full details."
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::db::SqliteStore;
    use crate::errors::StoreError;
    use crate::models::{Booking, NewBooking};
    use crate::services::ai::{LlmProvider, Message};

    struct Fixed(&'static str);

    #[async_trait]
    impl LlmProvider for Fixed {
        async fn chat(&self, _system: &str, _messages: &[Message]) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl BookingStore for Broken {
        fn find_one(&self, _filter: &BookingFilter) -> anyhow::Result<Option<Booking>> {
            anyhow::bail!("no such table: bookings (/var/db/skydesk.db)")
        }

        fn find_many(&self, _filter: &BookingFilter, _limit: usize) -> anyhow::Result<Vec<Booking>> {
            anyhow::bail!("no such table: bookings (/var/db/skydesk.db)")
        }

        fn create(&self, _booking: NewBooking) -> Result<Booking, StoreError> {
            Err(anyhow::anyhow!("no such table: bookings (/var/db/skydesk.db)").into())
        }

        fn save(&self, _booking: &Booking) -> anyhow::Result<()> {
            anyhow::bail!("no such table: bookings (/var/db/skydesk.db)")
        }
    }

    fn broken_handler(reply: &'static str) -> StatusHandler {
        let extractor = Arc::new(FieldExtractor::new(Arc::new(Fixed(reply)), Duration::from_secs(1)));
        let flights = SqliteStore::open(":memory:").unwrap();
        StatusHandler::new(extractor, Arc::new(flights), Arc::new(Broken))
    }

    #[tokio::test]
    async fn test_storage_failure_becomes_generic_reply() {
        let caller = Caller::new("u1", "u1@example.com");
        for reply in [
            r#"{"confirmation_number": "BK-ABC123", "flight_number": null}"#,
            r#"{"confirmation_number": null, "flight_number": null}"#,
        ] {
            let out = broken_handler(reply).status("where is my booking", &caller).await;
            assert!(!out.success);
            assert_eq!(out.message, STATUS_ERROR);
            assert!(!out.message.contains("/var/db"));
        }
    }
}
