use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tokio_stream::StreamExt as _;

use selflow_brain::{ChatOutcome, ChatResponse};
use selflow_core::ContextType;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context_type: ContextType,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

impl ChatRequest {
    fn validated(self) -> Result<Self, AppError> {
        if self.message.trim().is_empty() {
            return Err(AppError::bad_request("message must not be empty"));
        }
        Ok(self)
    }
}

/// POST /api/chat: one conversational turn.
pub async fn chat(
    State(app): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let body = body.validated()?;
    let reply = app
        .brain
        .process_user_input(&body.message, body.context_type)
        .await?;
    Ok(Json(reply))
}

/// POST /api/chat/agent: chat through the user-interface agent with fallback.
pub async fn chat_with_agent(
    State(app): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatOutcome>, AppError> {
    let body = body.validated()?;
    let outcome = app
        .brain
        .chat_with_user_interface_agent(&body.message, body.context.as_ref())
        .await?;
    Ok(Json(outcome))
}

/// POST /api/chat/stream: SSE stream of `fragment` events followed by one
/// `done` event.
pub async fn chat_stream(
    State(app): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let body = body.validated()?;
    let fragments = app
        .brain
        .stream_user_response(body.message, body.context_type)
        .map(|fragment| Ok::<Event, Infallible>(Event::default().event("fragment").data(fragment)));
    let done = tokio_stream::once(Ok::<Event, Infallible>(
        Event::default().event("done").data(""),
    ));
    Ok(Sse::new(fragments.chain(done)).keep_alive(KeepAlive::default()))
}
