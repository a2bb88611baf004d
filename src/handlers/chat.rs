use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::ConversationRequest;
use crate::services::conversation;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatMessage {
    pub message: String,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

// POST /api/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatMessage>,
) -> Json<ChatResponse> {
    let request = ConversationRequest {
        utterance: payload.message.trim().to_string(),
        summary: payload.summary,
    };

    tracing::info!(message = %request.utterance, "incoming chat message");
    let reply = conversation::process_message(&state, request).await;

    Json(ChatResponse { reply })
}
