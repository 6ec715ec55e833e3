//! `selflow-brain`: the orchestration hub of SelFlow.
//!
//! A [`CentralBrain`] owns no model and no storage. It routes conversation to
//! a [`GenerationClient`], remembers turns through a [`ContextStore`], gates
//! natural-language commands by their [`Disposition`](selflow_core::Disposition)
//! and delegates specialized work to optional agents.
//!
//! ```rust,ignore
//! use selflow_brain::CentralBrain;
//! use selflow_core::{BrainConfig, ContextType};
//!
//! let brain = CentralBrain::builder(BrainConfig::default())
//!     .system_controller(|| Ok(MyController::new()))
//!     .launch()
//!     .await?;
//! let reply = brain.process_user_input("hello", ContextType::Chat).await?;
//! println!("{}", reply.message);
//! brain.stop().await;
//! ```

mod brain;
pub mod collaborators;
pub mod context;
mod guard;
pub mod ollama;
pub mod reply;

pub use brain::{BrainBuilder, CentralBrain};
pub use collaborators::{
    ActionExecutor, AgentReply, ApprovedAction, CommandTranslator, ContextStore, EmbryoTrainer,
    ExecutionReport, FragmentStream, GenerationClient, GenerationHealth, TaskOrchestrator,
    UserInterfaceAgent,
};
pub use context::InMemoryContextStore;
pub use reply::{
    ChatOutcome, ChatResponse, CommandOutcome, Failure, FailureKind, HealthStatus, SystemInsights,
};
