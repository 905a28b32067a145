pub mod ai;
pub mod booking;
pub mod cancellation;
pub mod destinations;
pub mod format;
pub mod orchestrator;
pub mod status;

use serde::Serialize;

use crate::models::Booking;

/// What an intent handler hands back. Failures are ordinary values carrying
/// a customer-facing explanation.
#[derive(Debug, Clone, Serialize)]
pub struct AgentReply {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
}

impl AgentReply {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            booking: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            booking: None,
        }
    }

    pub fn with_booking(mut self, booking: Booking) -> Self {
        self.booking = Some(booking);
        self
    }
}
