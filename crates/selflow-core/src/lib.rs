pub mod action;
pub mod config;
pub mod error;
pub mod prompts;
pub mod types;

pub use action::{Disposition, Gate, SystemAction};
pub use config::BrainConfig;
pub use error::{BrainError, Result};
pub use types::{
    Capability, ContextType, ContextUpdate, ConversationTurn, GenerationContext,
    InteractionMetadata, InteractionRecord,
};
