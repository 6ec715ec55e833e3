use serde_json::Value;

use selflow_core::prompts::COMMAND_APOLOGY;
use selflow_core::{BrainError, Capability, Gate, SystemAction};

use super::CentralBrain;
use crate::collaborators::ApprovedAction;
use crate::guard::shielded;
use crate::reply::{CommandOutcome, Failure};

impl CentralBrain {
    /// Ask the command translator what a natural-language command means.
    pub async fn translate_user_command(
        &self,
        command: &str,
        user_context: Option<&Value>,
    ) -> Result<SystemAction, Failure> {
        let collaborators = self.running_snapshot().map_err(Failure::from_error)?;
        let translator = collaborators
            .translator
            .ok_or(BrainError::Unavailable(Capability::CommandTranslator))
            .map_err(Failure::from_error)?;

        let action = shielded(
            Capability::CommandTranslator,
            translator.translate_user_command(command, user_context),
        )
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "command translation failed");
            Failure::apologizing(e, COMMAND_APOLOGY)
        })?;

        tracing::info!(
            action_id = %action.action_id,
            recommended_action = %action.recommended_action,
            "command translated"
        );
        Ok(action)
    }

    /// Translate a command and act on its disposition. Only an action whose
    /// own disposition is `execute` ever reaches the executor.
    pub async fn process_user_command(
        &self,
        command: &str,
        user_context: Option<&Value>,
    ) -> Result<CommandOutcome, Failure> {
        let action = self.translate_user_command(command, user_context).await?;

        match action.recommended_action.gate() {
            Gate::AwaitUserInput => {
                tracing::info!(action_id = %action.action_id, "command needs user input");
                Ok(CommandOutcome::awaiting_input(action))
            }
            Gate::Refuse => {
                tracing::info!(action_id = %action.action_id, "command denied");
                Ok(CommandOutcome::refused(action))
            }
            Gate::Execute => {
                let action_id = action.action_id.clone();
                let approved = ApprovedAction::approve(action).ok_or_else(|| {
                    Failure::new(
                        &BrainError::ContractViolation("execute gate without execute disposition".into()),
                        COMMAND_APOLOGY,
                    )
                    .with_action_id(action_id.clone())
                })?;
                self.execute(approved).await.map_err(|e| {
                    tracing::error!(action_id = %action_id, error = %e, "command execution failed");
                    Failure::new(&e, COMMAND_APOLOGY).with_action_id(action_id)
                })
            }
        }
    }

    async fn execute(&self, approved: ApprovedAction) -> Result<CommandOutcome, BrainError> {
        let executor = self
            .running_snapshot()?
            .executor
            .ok_or(BrainError::Unavailable(Capability::ActionExecutor))?;

        let report = shielded(
            Capability::ActionExecutor,
            executor.execute_system_action(&approved),
        )
        .await?;
        tracing::info!(action_id = approved.action_id(), success = report.success, "command executed");
        Ok(CommandOutcome::executed(
            approved.action_id().to_string(),
            report,
        ))
    }
}
