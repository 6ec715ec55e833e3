//! Contracts the brain requires from its collaborators.
//!
//! Every collaborator is optional at runtime and reached through one of these
//! traits. Faults are reported as `anyhow::Error` and converted to typed
//! failures at the call site.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use selflow_core::{
    ContextType, ContextUpdate, ConversationTurn, Disposition, GenerationContext, SystemAction,
};

/// Text fragments of a streamed generation, in order.
pub type FragmentStream = BoxStream<'static, anyhow::Result<String>>;

// ---------------------------------------------------------------------------
// Leaf collaborators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationHealth {
    pub is_healthy: bool,
    pub model_name: String,
}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn start(&self) -> anyhow::Result<()>;

    async fn close(&self) -> anyhow::Result<()>;

    async fn generate_response(
        &self,
        prompt: &str,
        context: &GenerationContext,
        system_prompt: &str,
    ) -> anyhow::Result<String>;

    async fn stream_response(
        &self,
        prompt: &str,
        context: &GenerationContext,
        system_prompt: &str,
    ) -> anyhow::Result<FragmentStream>;

    /// Cached health; must not block.
    fn get_health_status(&self) -> GenerationHealth;
}

#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn build_context(
        &self,
        interaction_type: &ContextType,
        user_message: &str,
    ) -> anyhow::Result<Vec<ConversationTurn>>;

    async fn update_context(&self, update: ContextUpdate) -> anyhow::Result<()>;

    fn get_context_summary(&self) -> Value;
}

#[async_trait]
pub trait CommandTranslator: Send + Sync {
    async fn translate_user_command(
        &self,
        command: &str,
        user_context: Option<&Value>,
    ) -> anyhow::Result<SystemAction>;
}

/// What an executor reports back after running an approved action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl ExecutionReport {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Value::Null,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: Value::Null,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// A [`SystemAction`] whose own disposition is exactly `execute`.
///
/// Only the command pipeline can mint one, so an executor can never be handed
/// an action the translator did not clear.
#[derive(Debug, Clone)]
pub struct ApprovedAction {
    action: SystemAction,
}

impl ApprovedAction {
    pub(crate) fn approve(action: SystemAction) -> Option<Self> {
        (action.recommended_action == Disposition::Execute).then_some(Self { action })
    }

    pub fn action(&self) -> &SystemAction {
        &self.action
    }

    pub fn action_id(&self) -> &str {
        &self.action.action_id
    }

    pub fn details(&self) -> &Value {
        &self.action.details
    }
}

#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute_system_action(&self, action: &ApprovedAction)
        -> anyhow::Result<ExecutionReport>;
}

// ---------------------------------------------------------------------------
// Specialized agents
// ---------------------------------------------------------------------------

/// Result of a specialized-agent call. Only `success` is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl AgentReply {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[async_trait]
pub trait UserInterfaceAgent: Send + Sync {
    async fn process_chat_message(
        &self,
        message: &str,
        context: Option<&Value>,
    ) -> anyhow::Result<AgentReply>;
}

#[async_trait]
pub trait TaskOrchestrator: Send + Sync {
    async fn coordinate_task(
        &self,
        task_description: &str,
        context: Option<&Value>,
    ) -> anyhow::Result<AgentReply>;
}

#[async_trait]
pub trait EmbryoTrainer: Send + Sync {
    async fn generate_training_labels(&self, events: &[Value]) -> anyhow::Result<AgentReply>;

    async fn validate_embryo_training(&self, embryo_data: &Value) -> anyhow::Result<AgentReply>;

    async fn assess_birth_readiness(&self, embryo_data: &Value) -> anyhow::Result<AgentReply>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_execute_actions_can_be_approved() {
        for d in Disposition::all() {
            let approved = ApprovedAction::approve(SystemAction::new(*d, "x"));
            assert_eq!(approved.is_some(), *d == Disposition::Execute, "{d}");
        }
    }

    #[test]
    fn approved_action_exposes_the_action() {
        let action = SystemAction::new(Disposition::Execute, "ok")
            .with_details(serde_json::json!({"op": "status"}));
        let id = action.action_id.clone();
        let approved = ApprovedAction::approve(action).unwrap();
        assert_eq!(approved.action_id(), id);
        assert_eq!(approved.details()["op"], "status");
    }

    #[test]
    fn agent_reply_omits_empty_fields() {
        let json = serde_json::to_value(AgentReply::ok(Value::Null)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true}));
    }

    #[test]
    fn execution_report_deserializes_minimal_shape() {
        let report: ExecutionReport = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!report.success);
        assert!(report.message.is_none());
    }
}
