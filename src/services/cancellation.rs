use std::sync::Arc;

use crate::db::{BookingFilter, BookingStore, FlightStore};
use crate::models::{BookingStatus, Caller, ExtractedFields, Field, IntentKind};
use crate::services::ai::extract::FieldExtractor;
use crate::services::{format, AgentReply};

const CANCELLATION_ERROR: &str =
    "Sorry, there was an error cancelling your booking. Please try again in a moment.";

const NEED_IDENTIFIER: &str = "Which booking should I cancel? Please give me the confirmation number \
     (e.g. \"Cancel booking BK-ABC123\") or the flight number (e.g. \"Cancel my flight AA101\").";

pub struct CancellationHandler {
    extractor: Arc<FieldExtractor>,
    flights: Arc<dyn FlightStore>,
    bookings: Arc<dyn BookingStore>,
}

impl CancellationHandler {
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

    pub async fn cancel(&self, message: &str, caller: &Caller) -> AgentReply {
        let fields = self.extractor.extract(IntentKind::Cancellation, message).await;

        match self.cancel_with(&fields, caller) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, user_id = %caller.user_id, "cancellation failed");
                AgentReply::failure(CANCELLATION_ERROR)
            }
        }
    }

    fn cancel_with(&self, fields: &ExtractedFields, caller: &Caller) -> anyhow::Result<AgentReply> {
        let mine = BookingFilter::for_user(&caller.user_id);

        let mut booking = match (&fields.confirmation_number, &fields.flight_number) {
            (Field::Present(code), _) => {
                match self.bookings.find_one(&mine.confirmation_number(code))? {
                    Some(booking) => booking,
                    None => {
                        return Ok(AgentReply::failure(format!(
                            "Booking {code} not found. Please check the confirmation number."
                        )));
                    }
                }
            }
            (_, Field::Present(number)) => {
                let active = mine.flight_number(number).status(BookingStatus::Confirmed);
                match self.bookings.find_one(&active)? {
                    Some(booking) => booking,
                    None => {
                        return Ok(AgentReply::failure(format!(
                            "I couldn't find a confirmed booking of yours on flight {number}. \
                             Please give me the confirmation number instead (e.g. BK-ABC123)."
                        )));
                    }
                }
            }
            (Field::Invalid(raw), _) => {
                return Ok(AgentReply::failure(format!(
                    "\"{raw}\" doesn't look like a confirmation number. They look like BK-ABC123."
                )));
            }
            (_, Field::Invalid(raw)) => {
                return Ok(AgentReply::failure(format!(
                    "\"{raw}\" doesn't look like a flight number. They look like AA101."
                )));
            }
            _ => return Ok(AgentReply::failure(NEED_IDENTIFIER)),
        };

        if booking.status == BookingStatus::Cancelled {
            return Ok(AgentReply::failure(format!(
                "Booking {} was already cancelled.",
                booking.confirmation_number
            )));
        }

        booking.status = BookingStatus::Cancelled;
        self.bookings.save(&booking)?;

        tracing::info!(
            user_id = %caller.user_id,
            confirmation = %booking.confirmation_number,
            flight_number = %booking.flight_number,
            "booking cancelled"
        );

        let flight = match self.flights.find_by_number(&booking.flight_number) {
            Ok(Some(flight)) => format!("\n\n{}", format::flight_details(&flight)),
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!(error = %e, "flight lookup after cancellation failed");
                String::new()
            }
        };

        Ok(AgentReply::success(format!(
            "Booking cancelled.\n\n{}{flight}",
            format::booking_details(&booking)
        ))
        .with_booking(booking))
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
            anyhow::bail!("database is locked (/var/db/skydesk.db)")
        }

        fn find_many(&self, _filter: &BookingFilter, _limit: usize) -> anyhow::Result<Vec<Booking>> {
            anyhow::bail!("database is locked (/var/db/skydesk.db)")
        }

        fn create(&self, _booking: NewBooking) -> Result<Booking, StoreError> {
            Err(anyhow::anyhow!("database is locked (/var/db/skydesk.db)").into())
        }

        fn save(&self, _booking: &Booking) -> anyhow::Result<()> {
            anyhow::bail!("database is locked (/var/db/skydesk.db)")
        }
    }

    #[tokio::test]
    async fn test_storage_failure_becomes_generic_reply() {
        let extractor = Arc::new(FieldExtractor::new(
            Arc::new(Fixed(r#"{"confirmation_number": "BK-ABC123"}"#)),
            Duration::from_secs(1),
        ));
        let flights = SqliteStore::open(":memory:").unwrap();
        let handler = CancellationHandler::new(extractor, Arc::new(flights), Arc::new(Broken));

        let out = handler
            .cancel("cancel BK-ABC123", &Caller::new("u1", "u1@example.com"))
            .await;
        assert!(!out.success);
        assert_eq!(out.message, CANCELLATION_ERROR);
        assert!(!out.message.contains("/var/db"));
        assert!(out.booking.is_none());
    }
}
