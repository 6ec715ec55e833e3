use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ContextType
// ---------------------------------------------------------------------------

/// The conversational mode an interaction runs in.
///
/// The four named modes select dedicated system prompts. Any other string is
/// kept verbatim in [`ContextType::Other`] and receives the base prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContextType {
    #[default]
    Chat,
    SystemControl,
    AgentOrchestration,
    EmbryoTraining,
    Other(String),
}

impl ContextType {
    pub fn all() -> &'static [ContextType] {
        &[
            ContextType::Chat,
            ContextType::SystemControl,
            ContextType::AgentOrchestration,
            ContextType::EmbryoTraining,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContextType::Chat => "chat",
            ContextType::SystemControl => "system_control",
            ContextType::AgentOrchestration => "agent_orchestration",
            ContextType::EmbryoTraining => "embryo_training",
            ContextType::Other(s) => s,
        }
    }
}

impl From<&str> for ContextType {
    fn from(s: &str) -> Self {
        match s {
            "chat" => ContextType::Chat,
            "system_control" => ContextType::SystemControl,
            "agent_orchestration" => ContextType::AgentOrchestration,
            "embryo_training" => ContextType::EmbryoTraining,
            other => ContextType::Other(other.to_string()),
        }
    }
}

impl From<String> for ContextType {
    fn from(s: String) -> Self {
        ContextType::from(s.as_str())
    }
}

impl From<ContextType> for String {
    fn from(c: ContextType) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// A collaborator the brain calls through a narrow contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    GenerationClient,
    ContextStore,
    UserInterface,
    AgentOrchestrator,
    EmbryoTrainer,
    CommandTranslator,
    ActionExecutor,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::GenerationClient => "generation_client",
            Capability::ContextStore => "context_store",
            Capability::UserInterface => "user_interface",
            Capability::AgentOrchestrator => "agent_orchestrator",
            Capability::EmbryoTrainer => "embryo_trainer",
            Capability::CommandTranslator => "command_translator",
            Capability::ActionExecutor => "action_executor",
        }
    }

    /// Human-facing name used in failure messages.
    pub fn label(self) -> &'static str {
        match self {
            Capability::GenerationClient => "Generation client",
            Capability::ContextStore => "Context store",
            Capability::UserInterface => "User Interface Agent",
            Capability::AgentOrchestrator => "Agent Orchestrator",
            Capability::EmbryoTrainer => "Embryo Trainer",
            Capability::CommandTranslator => "SystemController",
            Capability::ActionExecutor => "SystemController executor",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Conversation context
// ---------------------------------------------------------------------------

/// One past user/assistant exchange as seen by the generation client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_message: String,
    pub assistant_response: String,
    pub context_type: ContextType,
    pub timestamp: DateTime<Utc>,
}

/// The context handed to the generation client alongside each prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub conversation_history: Vec<ConversationTurn>,
}

impl GenerationContext {
    pub fn new(conversation_history: Vec<ConversationTurn>) -> Self {
        Self {
            conversation_history,
        }
    }
}

// ---------------------------------------------------------------------------
// InteractionRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionMetadata {
    pub interaction_id: u64,
    /// Seconds between the start of the turn and the end of generation.
    pub response_time: f64,
}

/// The post-turn write handed to the context store. Never retained by the brain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_message: String,
    pub assistant_response: String,
    pub context_type: ContextType,
    pub metadata: InteractionMetadata,
}

/// Everything the brain may write to the context store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextUpdate {
    Interaction(InteractionRecord),
    SystemState {
        system_state: serde_json::Value,
        update_time: DateTime<Utc>,
    },
}

impl ContextUpdate {
    pub fn as_interaction(&self) -> Option<&InteractionRecord> {
        match self {
            ContextUpdate::Interaction(r) => Some(r),
            ContextUpdate::SystemState { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_type_parses_named_modes() {
        for ct in ContextType::all() {
            assert_eq!(&ContextType::from(ct.as_str()), ct);
        }
    }

    #[test]
    fn unknown_context_type_is_kept_verbatim() {
        let ct = ContextType::from("poetry");
        assert_eq!(ct, ContextType::Other("poetry".into()));
        assert_eq!(ct.to_string(), "poetry");
    }

    #[test]
    fn context_type_serializes_as_plain_string() {
        let json = serde_json::to_string(&ContextType::SystemControl).unwrap();
        assert_eq!(json, "\"system_control\"");
        let parsed: ContextType = serde_json::from_str("\"embryo_training\"").unwrap();
        assert_eq!(parsed, ContextType::EmbryoTraining);
    }

    #[test]
    fn capability_labels_match_failure_wording() {
        assert_eq!(Capability::AgentOrchestrator.to_string(), "Agent Orchestrator");
        assert_eq!(Capability::EmbryoTrainer.to_string(), "Embryo Trainer");
        assert_eq!(Capability::CommandTranslator.to_string(), "SystemController");
    }

    #[test]
    fn context_update_is_tagged_by_kind() {
        let update = ContextUpdate::SystemState {
            system_state: serde_json::json!({"cpu": 12}),
            update_time: Utc::now(),
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["kind"], "system_state");
        assert_eq!(value["system_state"]["cpu"], 12);
        assert!(update.as_interaction().is_none());
    }
}
