//! System prompts and user-facing messages.
//!
//! Prompt selection is pure data: the same [`ContextType`] always yields the
//! same text.

use crate::types::ContextType;

pub const BASE_PROMPT: &str = "You are the Central AI Brain of SelFlow, a self-creating AI operating system.

Your personality:
- Helpful and knowledgeable about the SelFlow system
- Clear and concise in explanations
- Proactive in offering assistance
- Respectful of user privacy and preferences
- Enthusiastic about AI and system capabilities

Your core capabilities:
- Answer questions about SelFlow functionality
- Execute user commands by coordinating with specialized agents
- Provide system status and insights
- Offer proactive suggestions based on user patterns
- Learn and adapt from interactions";

/// Shown when the brain is not running.
pub const NOT_AVAILABLE_APOLOGY: &str =
    "I apologize, but I'm not currently available. Please try again later.";

/// Shown when a conversational turn fails.
pub const PROCESSING_APOLOGY: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";

/// Emitted as the final fragment when a streamed turn fails.
pub const STREAM_APOLOGY: &str = "I apologize, but I encountered an error. Please try again.";

/// Shown when the command pipeline fails.
pub const COMMAND_APOLOGY: &str = "I encountered an error processing your command.";

/// Shown when a specialized agent or the context store faults.
pub const DELEGATION_APOLOGY: &str =
    "I encountered an error while handing this to a specialized agent. Please try again.";

/// Executor message used when the executor reported none.
pub const ACTION_COMPLETED: &str = "Action completed";

fn mode_suffix(context_type: &ContextType) -> Option<&'static str> {
    match context_type {
        ContextType::Chat => Some("You are in casual conversation mode. Be friendly and helpful."),
        ContextType::SystemControl => Some(
            "You are in system control mode. Focus on understanding and executing system commands safely.",
        ),
        ContextType::AgentOrchestration => Some(
            "You are coordinating multiple agents. Focus on task delegation and result synthesis.",
        ),
        ContextType::EmbryoTraining => Some(
            "You are evaluating embryo training. Focus on pattern analysis and specialization recommendations.",
        ),
        ContextType::Other(_) => None,
    }
}

/// The system prompt for a conversational mode. Unknown modes get [`BASE_PROMPT`].
pub fn system_prompt(context_type: &ContextType) -> String {
    match mode_suffix(context_type) {
        Some(suffix) => format!("{BASE_PROMPT}\n\n{suffix}"),
        None => BASE_PROMPT.to_string(),
    }
}
