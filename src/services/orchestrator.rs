use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::db::{BookingStore, FlightStore};
use crate::models::{Booking, Caller, IntentKind};
use crate::services::ai::extract::FieldExtractor;
use crate::services::ai::router::IntentRouter;
use crate::services::ai::LlmProvider;
use crate::services::booking::BookingHandler;
use crate::services::cancellation::CancellationHandler;
use crate::services::status::StatusHandler;
use crate::services::AgentReply;

const GENERIC_FAILURE: &str =
    "Sorry, something went wrong while handling your request. Please try again.";

pub const AGENTS: [&str; 4] = ["router", "booking", "status", "cancellation"];

/// Uniform result of one chat turn, tagged with the intent that handled it.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub message: String,
    pub intent: IntentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
}

impl ChatResponse {
    fn from_reply(intent: IntentKind, reply: AgentReply) -> Self {
        Self {
            success: reply.success,
            message: reply.message,
            intent,
            booking: reply.booking,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    pub agents: Vec<&'static str>,
    pub status: &'static str,
}

struct Agents {
    router: IntentRouter,
    booking: BookingHandler,
    status: StatusHandler,
    cancellation: CancellationHandler,
}

impl Agents {
    async fn dispatch(&self, message: &str, caller: &Caller) -> ChatResponse {
        let intent = self.router.route(message).await;
        tracing::info!(user_id = %caller.user_id, intent = intent.as_str(), "routed message");

        let reply = match intent {
            IntentKind::Booking => self.booking.book(message, caller).await,
            IntentKind::Status => self.status.status(message, caller).await,
            IntentKind::Cancellation => self.cancellation.cancel(message, caller).await,
            IntentKind::Unclear => AgentReply::failure(self.router.clarification_message()),
        };

        ChatResponse::from_reply(intent, reply)
    }
}

/// Single entry point for chat messages. Cheap to clone; every clone shares
/// the same router and handlers.
#[derive(Clone)]
pub struct Orchestrator {
    agents: Arc<Agents>,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        flights: Arc<dyn FlightStore>,
        bookings: Arc<dyn BookingStore>,
        llm_timeout: Duration,
    ) -> Self {
        let extractor = Arc::new(FieldExtractor::new(llm.clone(), llm_timeout));

        let agents = Agents {
            router: IntentRouter::new(llm, llm_timeout),
            booking: BookingHandler::new(extractor.clone(), flights.clone(), bookings.clone()),
            status: StatusHandler::new(extractor.clone(), flights.clone(), bookings.clone()),
            cancellation: CancellationHandler::new(extractor, flights, bookings),
        };

        Self {
            agents: Arc::new(agents),
        }
    }

    /// Routes and handles one message. Never fails: a handler that panics
    /// still produces a non-success response tagged `unclear`.
    pub async fn process_message(&self, message: &str, caller: &Caller) -> ChatResponse {
        let agents = self.agents.clone();
        let message = message.to_string();
        let task_caller = caller.clone();

        let handle =
            tokio::spawn(async move { agents.dispatch(&message, &task_caller).await });

        match handle.await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, user_id = %caller.user_id, "message dispatch aborted");
                ChatResponse {
                    success: false,
                    message: GENERIC_FAILURE.to_string(),
                    intent: IntentKind::Unclear,
                    booking: None,
                }
            }
        }
    }

    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            agents: AGENTS.to_vec(),
            status: "operational",
        }
    }
}
