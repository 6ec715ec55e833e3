use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use selflow_brain::AgentReply;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub task: String,
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct LabelRequest {
    pub events: Vec<Value>,
}

/// POST /api/tasks/orchestrate
pub async fn orchestrate_task(
    State(app): State<AppState>,
    Json(body): Json<TaskRequest>,
) -> Result<Json<AgentReply>, AppError> {
    if body.task.trim().is_empty() {
        return Err(AppError::bad_request("task must not be empty"));
    }
    let reply = app
        .brain
        .orchestrate_complex_task(&body.task, body.context.as_ref())
        .await?;
    Ok(Json(reply))
}

/// POST /api/training/labels
pub async fn generate_labels(
    State(app): State<AppState>,
    Json(body): Json<LabelRequest>,
) -> Result<Json<AgentReply>, AppError> {
    let reply = app.brain.generate_training_labels(&body.events).await?;
    Ok(Json(reply))
}

/// POST /api/embryos/validate: the body is the embryo data.
pub async fn validate_embryo(
    State(app): State<AppState>,
    Json(embryo): Json<Value>,
) -> Result<Json<AgentReply>, AppError> {
    let reply = app.brain.validate_embryo_training(&embryo).await?;
    Ok(Json(reply))
}

/// POST /api/embryos/birth-readiness: the body is the embryo data.
pub async fn birth_readiness(
    State(app): State<AppState>,
    Json(embryo): Json<Value>,
) -> Result<Json<AgentReply>, AppError> {
    let reply = app.brain.assess_embryo_birth_readiness(&embryo).await?;
    Ok(Json(reply))
}

/// POST /api/system-state: record a system-state change.
pub async fn update_system_state(
    State(app): State<AppState>,
    Json(state): Json<Value>,
) -> Result<StatusCode, AppError> {
    if !state.is_object() {
        return Err(AppError::bad_request("system state must be a JSON object"));
    }
    app.brain.update_system_state(state).await?;
    Ok(StatusCode::NO_CONTENT)
}
