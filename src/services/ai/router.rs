use std::sync::Arc;
use std::time::Duration;

use crate::models::IntentKind;
use crate::services::ai::{complete, LlmProvider};

const ROUTER_PROMPT: &str = r#"You are the routing step of a flight booking assistant. Decide which team should handle the customer's message.

Categories:
- booking: booking a new flight (book, reserve, buy a ticket, fly to somewhere)
- status: checking a flight or an existing booking (status, check, confirmation, when does my flight leave)
- cancellation: cancelling an existing booking (cancel, remove, drop my reservation)
- unclear: anything else, or when you cannot tell

Answer with ONE WORD ONLY: booking, status, cancellation, or unclear.

Examples:
"I want to book flight AA101 for John Doe" -> booking
"Find me a flight to Miami" -> booking
"What's the status of my booking BK-ABC123?" -> status
"Cancel my reservation BK-ABC123" -> cancellation
"Hello there" -> unclear
"#;

pub const CLARIFICATION_MESSAGE: &str = "I can help you with flight bookings. Here is what I can do:

1. Book a new flight (e.g. \"Book flight AA101 for John Doe\" or \"Book a flight to New York for Jane Smith\")
2. Check a flight or booking (e.g. \"What's the status of booking BK-ABC123?\")
3. Cancel a booking (e.g. \"Cancel my reservation BK-ABC123\")

How can I help you today?";

/// Maps a raw model reply to an intent. Anything but an exact label
/// (ignoring case and surrounding whitespace) is `Unclear`.
pub fn parse_route_label(reply: &str) -> IntentKind {
    IntentKind::from_label(&reply.trim().to_lowercase()).unwrap_or(IntentKind::Unclear)
}

pub struct IntentRouter {
    llm: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl IntentRouter {
    pub fn new(llm: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub async fn route(&self, message: &str) -> IntentKind {
        match complete(self.llm.as_ref(), ROUTER_PROMPT, message, self.timeout).await {
            Ok(reply) => {
                let intent = parse_route_label(&reply);
                if intent == IntentKind::Unclear && !reply.trim().eq_ignore_ascii_case("unclear") {
                    tracing::info!(reply = %reply.trim(), "unexpected router reply, falling back to unclear");
                }
                intent
            }
            Err(e) => {
                tracing::warn!(error = %e, "router call failed, falling back to unclear");
                IntentKind::Unclear
            }
        }
    }

    pub fn clarification_message(&self) -> &'static str {
        CLARIFICATION_MESSAGE
    }
}
