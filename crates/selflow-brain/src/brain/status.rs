use chrono::Utc;
use serde_json::{json, Value};

use selflow_core::Capability;

use super::CentralBrain;
use crate::guard::shielded_sync;
use crate::reply::{
    AgentAvailability, HealthStatus, InteractionStatistics, PerformanceMetrics, SystemInsights,
};

impl CentralBrain {
    pub fn get_health_status(&self) -> HealthStatus {
        let collaborators = self.snapshot();

        let generation = collaborators
            .generation
            .as_ref()
            .and_then(|g| shielded_sync(Capability::GenerationClient, || g.get_health_status()));

        HealthStatus {
            central_brain_running: self.is_running(),
            startup_time: self.startup_time(),
            interaction_count: self.interaction_count(),
            generation_healthy: generation.as_ref().is_some_and(|h| h.is_healthy),
            generation_model: generation.map(|h| h.model_name),
            context_manager_status: self.context_summary(),
            agents: AgentAvailability {
                user_interface: collaborators.user_interface.is_some(),
                agent_orchestrator: collaborators.orchestrator.is_some(),
                embryo_trainer: collaborators.trainer.is_some(),
                command_translator: collaborators.translator.is_some(),
                action_executor: collaborators.executor.is_some(),
            },
        }
    }

    pub fn get_system_insights(&self) -> SystemInsights {
        let total_interactions = self.interaction_count();
        let uptime_hours = self.uptime_hours();
        let interactions_per_hour =
            (uptime_hours > 0.0).then(|| total_interactions as f64 / uptime_hours);

        SystemInsights {
            interaction_statistics: InteractionStatistics {
                total_interactions,
                uptime_hours,
            },
            context_insights: self.context_summary().unwrap_or_else(|| json!({})),
            performance_metrics: PerformanceMetrics {
                interactions_per_hour,
            },
        }
    }

    /// One-line status, e.g. `Central AI Brain is online (uptime: 1.5h) - 3
    /// interactions processed`.
    pub fn get_status_summary(&self) -> String {
        if !self.is_running() {
            return "Central AI Brain is offline".to_string();
        }
        let uptime = self
            .startup_time()
            .map(|_| format!(" (uptime: {:.1}h)", self.uptime_hours()))
            .unwrap_or_default();
        format!(
            "Central AI Brain is online{uptime} - {} interactions processed",
            self.interaction_count()
        )
    }

    fn uptime_hours(&self) -> f64 {
        self.startup_time()
            .map(|t| (Utc::now() - t).num_milliseconds().max(0) as f64 / 3_600_000.0)
            .unwrap_or(0.0)
    }

    fn context_summary(&self) -> Option<Value> {
        let store = self.snapshot().context?;
        shielded_sync(Capability::ContextStore, || store.get_context_summary())
    }
}
