//! Axum route handler for the resume Q&A chat.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::chat::log::{ConversationLog, Role};
use crate::chat::prompts::{CHAT_FALLBACK, RESUME_SYSTEM_PROMPT};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<Uuid>,
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub response: String,
}

/// POST /api/v1/chat
///
/// Appends the question to the session's conversation log, asks the model,
/// and appends the answer. A failed completion degrades to a fallback reply
/// rather than an error status.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let question = request.question.trim().to_string();
    if question.is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }
    let session_id = request.session_id.unwrap_or_else(Uuid::new_v4);

    // Append the user turn and snapshot history under the lock; the remote
    // call happens outside it.
    let history = {
        let mut conversations = state.conversations.lock().expect("conversation lock");
        let log = conversations
            .entry(session_id)
            .or_insert_with(|| ConversationLog::with_system(RESUME_SYSTEM_PROMPT));
        log.append(Role::User, question);
        log.history().to_vec()
    };

    let answer = match state.chat.complete(&history).await {
        Ok(answer) => answer,
        Err(e) => {
            error!(error = %e, "chat completion failed");
            CHAT_FALLBACK.to_string()
        }
    };

    {
        let mut conversations = state.conversations.lock().expect("conversation lock");
        if let Some(log) = conversations.get_mut(&session_id) {
            log.append(Role::Assistant, answer.clone());
        }
    }

    Ok(Json(ChatResponse {
        session_id,
        response: answer,
    }))
}
