use anyhow::Context;
use selflow_core::Disposition;

use super::{runtime, Settings};
use crate::output::print_json;

pub fn run(settings: &Settings, command: &str, json: bool) -> anyhow::Result<()> {
    let brain = settings.brain()?;

    runtime()?.block_on(async {
        brain
            .start()
            .await
            .context("failed to start the central brain")?;
        let result = brain.process_user_command(command, None).await;
        brain.stop().await;
        let outcome = result?;

        if json {
            return print_json(&outcome);
        }
        let tag = match outcome.recommended_action {
            Disposition::Execute if outcome.success => "done",
            Disposition::Execute => "failed",
            Disposition::RequestConfirmation => "confirm",
            Disposition::RequestClarification => "clarify",
            Disposition::Deny => "denied",
        };
        println!("[{tag}] {}", outcome.message);
        println!("action: {}", outcome.action_id);
        Ok(())
    })
}
