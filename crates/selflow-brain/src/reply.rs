//! Typed results returned by every public brain operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use selflow_core::{BrainError, ContextType, Disposition, SystemAction};

use crate::collaborators::{AgentReply, ExecutionReport};

// ---------------------------------------------------------------------------
// Failure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotRunning,
    Unavailable,
    CollaboratorFault,
    ContractViolation,
    Unhealthy,
    Internal,
}

impl FailureKind {
    pub fn of(err: &BrainError) -> Self {
        match err {
            BrainError::NotRunning => FailureKind::NotRunning,
            BrainError::Unavailable(_) => FailureKind::Unavailable,
            BrainError::Collaborator { .. } => FailureKind::CollaboratorFault,
            BrainError::ContractViolation(_) => FailureKind::ContractViolation,
            BrainError::Unhealthy(_) => FailureKind::Unhealthy,
            BrainError::ConfigNotFound(_)
            | BrainError::Io(_)
            | BrainError::Yaml(_)
            | BrainError::Json(_) => FailureKind::Internal,
        }
    }
}

/// A failed operation: the internal error text plus a message safe to show
/// an end user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{error}")]
pub struct Failure {
    pub kind: FailureKind,
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
}

impl Failure {
    /// Wrap `err` behind a fixed user-facing `message`.
    pub fn new(err: &BrainError, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::of(err),
            error: err.to_string(),
            message: message.into(),
            action_id: None,
        }
    }

    /// Use the error text itself as the user-facing message.
    pub fn from_error(err: BrainError) -> Self {
        let message = err.to_string();
        Self::new(&err, message)
    }

    /// Keep `NotRunning` and `Unavailable` readable and put `apology` in
    /// front of every other fault. The raw text stays in `error`.
    pub fn apologizing(err: BrainError, apology: &str) -> Self {
        match FailureKind::of(&err) {
            FailureKind::NotRunning | FailureKind::Unavailable => Self::from_error(err),
            _ => Self::new(&err, apology),
        }
    }

    pub fn with_action_id(mut self, action_id: impl Into<String>) -> Self {
        self.action_id = Some(action_id.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub context_type: ContextType,
    pub interaction_id: u64,
    /// Seconds.
    pub response_time: f64,
}

/// Which path answered a user-interface chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatOutcome {
    Agent(AgentReply),
    Direct(ChatResponse),
}

impl ChatOutcome {
    pub fn is_delegated(&self) -> bool {
        matches!(self, ChatOutcome::Agent(_))
    }
}

// ---------------------------------------------------------------------------
// Command pipeline
// ---------------------------------------------------------------------------

/// The designed outcome of a translated command. Refusals and deferrals are
/// not errors: `recommended_action` says what happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub success: bool,
    pub requires_user_input: bool,
    pub message: String,
    pub action_id: String,
    pub recommended_action: Disposition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<ExecutionReport>,
}

impl CommandOutcome {
    pub(crate) fn awaiting_input(action: SystemAction) -> Self {
        Self {
            success: true,
            requires_user_input: true,
            message: action.user_feedback,
            action_id: action.action_id,
            recommended_action: action.recommended_action,
            results: None,
        }
    }

    pub(crate) fn refused(action: SystemAction) -> Self {
        Self {
            success: false,
            requires_user_input: false,
            message: action.user_feedback,
            action_id: action.action_id,
            recommended_action: action.recommended_action,
            results: None,
        }
    }

    pub(crate) fn executed(action_id: String, report: ExecutionReport) -> Self {
        Self {
            success: report.success,
            requires_user_input: false,
            message: report
                .message
                .clone()
                .unwrap_or_else(|| selflow_core::prompts::ACTION_COMPLETED.to_string()),
            action_id,
            recommended_action: Disposition::Execute,
            results: Some(report),
        }
    }
}

// ---------------------------------------------------------------------------
// Health & insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAvailability {
    pub user_interface: bool,
    pub agent_orchestrator: bool,
    pub embryo_trainer: bool,
    pub command_translator: bool,
    pub action_executor: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub central_brain_running: bool,
    pub startup_time: Option<DateTime<Utc>>,
    pub interaction_count: u64,
    pub generation_healthy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_model: Option<String>,
    pub context_manager_status: Option<Value>,
    pub agents: AgentAvailability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionStatistics {
    pub total_interactions: u64,
    pub uptime_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub interactions_per_hour: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInsights {
    pub interaction_statistics: InteractionStatistics,
    pub context_insights: Value,
    pub performance_metrics: PerformanceMetrics,
}
