use std::sync::Arc;
use std::time::Duration;

use crate::models::{ExtractedFields, IntentKind};
use crate::services::ai::json::first_json_object;
use crate::services::ai::{complete, LlmProvider};

const BOOKING_PROMPT: &str = r#"You extract flight booking details from a customer's message.

Return ONLY a JSON object (no markdown, no explanation) with exactly these keys. Use null for anything the customer did not say:
{
  "flight_number": "airline code plus number, e.g. AA101, or null",
  "passenger_name": "full passenger name or null",
  "passenger_email": "email address or null",
  "travel_date": "ISO date like 2025-02-15 or null",
  "destination": "city or airport the customer wants to fly to, or null",
  "origin": "city or airport the customer is flying from, or null"
}

Examples:
Customer: "Book flight AA101 for John Doe on 2025-02-15"
{"flight_number": "AA101", "passenger_name": "John Doe", "passenger_email": null, "travel_date": "2025-02-15", "destination": null, "origin": null}

Customer: "I need a flight from Chicago to New York for Jane Smith"
{"flight_number": null, "passenger_name": "Jane Smith", "passenger_email": null, "travel_date": null, "destination": "New York", "origin": "Chicago"}
"#;

const STATUS_PROMPT: &str = r#"You extract booking lookup details from a customer's message.

Return ONLY a JSON object (no markdown, no explanation) with exactly these keys. Use null for anything the customer did not say:
{
  "confirmation_number": "booking code like BK-ABC123 or ABC123, or null",
  "flight_number": "airline code plus number, e.g. AA101, or null"
}

Examples:
Customer: "What's the status of booking BK-ABC123?"
{"confirmation_number": "BK-ABC123", "flight_number": null}

Customer: "Check flight AA101"
{"confirmation_number": null, "flight_number": "AA101"}
"#;

const CANCELLATION_PROMPT: &str = r#"You extract which booking a customer wants to cancel.

Return ONLY a JSON object (no markdown, no explanation) with exactly these keys. Use null for anything the customer did not say:
{
  "confirmation_number": "booking code like BK-ABC123 or ABC123, or null",
  "flight_number": "airline code plus number, e.g. AA101, or null"
}

Examples:
Customer: "Cancel booking BK-ABC123"
{"confirmation_number": "BK-ABC123", "flight_number": null}

Customer: "Cancel my flight AA101"
{"confirmation_number": null, "flight_number": "AA101"}
"#;

fn prompt_for(kind: IntentKind) -> Option<&'static str> {
    match kind {
        IntentKind::Booking => Some(BOOKING_PROMPT),
        IntentKind::Status => Some(STATUS_PROMPT),
        IntentKind::Cancellation => Some(CANCELLATION_PROMPT),
        IntentKind::Unclear => None,
    }
}

/// Turns a message into validated fields for one intent. Never fails: a
/// model error, timeout, or unreadable reply yields an empty record and the
/// handler asks the customer for what is missing.
pub struct FieldExtractor {
    llm: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl FieldExtractor {
    pub fn new(llm: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub async fn extract(&self, kind: IntentKind, message: &str) -> ExtractedFields {
        let Some(prompt) = prompt_for(kind) else {
            return ExtractedFields::empty();
        };

        let reply = match complete(self.llm.as_ref(), prompt, message, self.timeout).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, intent = kind.as_str(), "field extraction call failed");
                return ExtractedFields::empty();
            }
        };

        let fields = parse_extraction(&reply);
        tracing::debug!(intent = kind.as_str(), ?fields, "extracted fields");
        fields
    }
}

pub fn parse_extraction(reply: &str) -> ExtractedFields {
    match first_json_object(reply) {
        Some(obj) => ExtractedFields::from_json(&obj),
        None => {
            tracing::warn!("no JSON object in extraction reply, treating as empty");
            ExtractedFields::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use crate::services::ai::Message;
    use async_trait::async_trait;

    struct Fixed(&'static str);

    #[async_trait]
    impl LlmProvider for Fixed {
        async fn chat(&self, _system: &str, _messages: &[Message]) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl LlmProvider for Failing {
        async fn chat(&self, _system: &str, _messages: &[Message]) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    struct Slow;

    #[async_trait]
    impl LlmProvider for Slow {
        async fn chat(&self, _system: &str, _messages: &[Message]) -> anyhow::Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(r#"{"flight_number": "AA101"}"#.to_string())
        }
    }

    fn extractor(llm: impl LlmProvider + 'static) -> FieldExtractor {
        FieldExtractor::new(Arc::new(llm), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_extracts_booking_fields() {
        let ex = extractor(Fixed(
            r#"Here you go: {"flight_number": "aa101", "passenger_name": "John Doe", "passenger_email": null}"#,
        ));
        let fields = ex.extract(IntentKind::Booking, "Book flight AA101 for John Doe").await;
        assert_eq!(fields.flight_number, Field::Present("AA101".to_string()));
        assert_eq!(fields.passenger_name, Field::Present("John Doe".to_string()));
        assert!(fields.passenger_email.is_absent());
    }

    #[tokio::test]
    async fn test_model_error_yields_empty_record() {
        let fields = extractor(Failing).extract(IntentKind::Status, "status?").await;
        assert_eq!(fields, ExtractedFields::empty());
    }

    #[tokio::test]
    async fn test_timeout_yields_empty_record() {
        let fields = extractor(Slow).extract(IntentKind::Booking, "Book AA101").await;
        assert_eq!(fields, ExtractedFields::empty());
    }

    #[tokio::test]
    async fn test_unparseable_reply_yields_empty_record() {
        let fields = extractor(Fixed("I could not find anything."))
            .extract(IntentKind::Cancellation, "cancel")
            .await;
        assert_eq!(fields, ExtractedFields::empty());
    }

    #[tokio::test]
    async fn test_unclear_intent_skips_model() {
        let fields = extractor(Failing).extract(IntentKind::Unclear, "hello").await;
        assert_eq!(fields, ExtractedFields::empty());
    }
}
