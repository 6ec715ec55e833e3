use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use selflow_brain::CommandOutcome;
use selflow_core::SystemAction;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

fn require_command(body: &CommandRequest) -> Result<(), AppError> {
    if body.command.trim().is_empty() {
        return Err(AppError::bad_request("command must not be empty"));
    }
    Ok(())
}

/// POST /api/commands: translate and, when cleared, execute a command.
pub async fn process_command(
    State(app): State<AppState>,
    Json(body): Json<CommandRequest>,
) -> Result<Json<CommandOutcome>, AppError> {
    require_command(&body)?;
    let outcome = app
        .brain
        .process_user_command(&body.command, body.context.as_ref())
        .await?;
    Ok(Json(outcome))
}

/// POST /api/commands/translate: translation only, nothing is executed.
pub async fn translate_command(
    State(app): State<AppState>,
    Json(body): Json<CommandRequest>,
) -> Result<Json<SystemAction>, AppError> {
    require_command(&body)?;
    let action = app
        .brain
        .translate_user_command(&body.command, body.context.as_ref())
        .await?;
    Ok(Json(action))
}
