use axum::extract::State;
use axum::Json;
use selflow_brain::{HealthStatus, SystemInsights};

use crate::state::AppState;

/// GET /api/health: aggregate health. Always 200; `central_brain_running`
/// says whether the brain is up.
pub async fn get_health(State(app): State<AppState>) -> Json<HealthStatus> {
    Json(app.brain.get_health_status())
}

/// GET /api/insights: usage statistics.
pub async fn get_insights(State(app): State<AppState>) -> Json<SystemInsights> {
    Json(app.brain.get_system_insights())
}

/// GET /api/status: one-line summary.
pub async fn get_status(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "running": app.brain.is_running(),
        "summary": app.brain.get_status_summary(),
    }))
}
