use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Booking, Caller, IntentKind};
use crate::services::orchestrator::OrchestratorStatus;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatReply {
    pub success: bool,
    pub reply: String,
    pub intent: IntentKind,
    pub booking: Option<Booking>,
}

// POST /api/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("message is required".to_string()));
    }

    let response = state.orchestrator.process_message(message, &caller).await;

    Ok(Json(ChatReply {
        success: response.success,
        reply: response.message,
        intent: response.intent,
        booking: response.booking,
    }))
}

// GET /api/chat/status
pub async fn chat_status(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
) -> Json<OrchestratorStatus> {
    Json(state.orchestrator.status())
}
