use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use selflow_core::prompts::DELEGATION_APOLOGY;
use selflow_core::{BrainError, Capability, ContextUpdate};

use super::CentralBrain;
use crate::collaborators::{AgentReply, EmbryoTrainer};
use crate::guard::shielded;
use crate::reply::Failure;

impl CentralBrain {
    pub async fn orchestrate_complex_task(
        &self,
        task_description: &str,
        context: Option<&Value>,
    ) -> Result<AgentReply, Failure> {
        let orchestrator = self
            .running_snapshot()
            .and_then(|c| {
                c.orchestrator
                    .ok_or(BrainError::Unavailable(Capability::AgentOrchestrator))
            })
            .map_err(Failure::from_error)?;

        tracing::info!(task = task_description, "delegating task to orchestrator");
        shielded(
            Capability::AgentOrchestrator,
            orchestrator.coordinate_task(task_description, context),
        )
        .await
        .map_err(|e| Failure::apologizing(e, DELEGATION_APOLOGY))
    }

    pub async fn generate_training_labels(&self, events: &[Value]) -> Result<AgentReply, Failure> {
        let trainer = self.trainer()?;
        tracing::info!(events = events.len(), "generating training labels");
        shielded(
            Capability::EmbryoTrainer,
            trainer.generate_training_labels(events),
        )
        .await
        .map_err(|e| Failure::apologizing(e, DELEGATION_APOLOGY))
    }

    pub async fn validate_embryo_training(&self, embryo_data: &Value) -> Result<AgentReply, Failure> {
        let trainer = self.trainer()?;
        shielded(
            Capability::EmbryoTrainer,
            trainer.validate_embryo_training(embryo_data),
        )
        .await
        .map_err(|e| Failure::apologizing(e, DELEGATION_APOLOGY))
    }

    pub async fn assess_embryo_birth_readiness(
        &self,
        embryo_data: &Value,
    ) -> Result<AgentReply, Failure> {
        let trainer = self.trainer()?;
        shielded(
            Capability::EmbryoTrainer,
            trainer.assess_birth_readiness(embryo_data),
        )
        .await
        .map_err(|e| Failure::apologizing(e, DELEGATION_APOLOGY))
    }

    /// Record a system-state change in the context store. A no-op when no
    /// store is installed.
    pub async fn update_system_state(&self, state: Value) -> Result<(), Failure> {
        let collaborators = self.running_snapshot().map_err(Failure::from_error)?;
        let Some(store) = collaborators.context else {
            return Ok(());
        };
        let update = ContextUpdate::SystemState {
            system_state: state,
            update_time: Utc::now(),
        };
        shielded(Capability::ContextStore, store.update_context(update))
            .await
            .map_err(|e| Failure::apologizing(e, DELEGATION_APOLOGY))
    }

    fn trainer(&self) -> Result<Arc<dyn EmbryoTrainer>, Failure> {
        self.running_snapshot()
            .and_then(|c| c.trainer.ok_or(BrainError::Unavailable(Capability::EmbryoTrainer)))
            .map_err(Failure::from_error)
    }
}
