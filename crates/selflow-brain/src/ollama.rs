//! [`GenerationClient`] backed by a local Ollama server.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use ollama_agent::{ChatTurn, OllamaClient, OllamaConfig};
use selflow_core::{BrainConfig, GenerationContext};

use crate::collaborators::{FragmentStream, GenerationClient, GenerationHealth};

/// Translate the brain config into client settings.
pub fn ollama_config(config: &BrainConfig) -> OllamaConfig {
    OllamaConfig {
        base_url: config.ai_brain.base_url.clone(),
        model: config.ai_brain.model_name.clone(),
        temperature: config.ai_brain.temperature,
        max_tokens: config.ai_brain.max_tokens,
        timeout: Duration::from_secs(config.ai_brain.timeout_seconds),
        max_context_turns: config.context_management.max_context_turns,
    }
}

fn history(context: &GenerationContext) -> Vec<ChatTurn> {
    context
        .conversation_history
        .iter()
        .map(|turn| ChatTurn {
            user: turn.user_message.clone(),
            assistant: turn.assistant_response.clone(),
        })
        .collect()
}

fn system(prompt: &str) -> Option<&str> {
    (!prompt.is_empty()).then_some(prompt)
}

#[async_trait]
impl GenerationClient for OllamaClient {
    async fn start(&self) -> anyhow::Result<()> {
        OllamaClient::start(self).await?;
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        OllamaClient::close(self).await;
        Ok(())
    }

    async fn generate_response(
        &self,
        prompt: &str,
        context: &GenerationContext,
        system_prompt: &str,
    ) -> anyhow::Result<String> {
        Ok(self
            .generate(prompt, &history(context), system(system_prompt))
            .await?)
    }

    async fn stream_response(
        &self,
        prompt: &str,
        context: &GenerationContext,
        system_prompt: &str,
    ) -> anyhow::Result<FragmentStream> {
        let fragments = self
            .stream(prompt, &history(context), system(system_prompt))
            .await?;
        Ok(fragments.map(|f| f.map_err(anyhow::Error::from)).boxed())
    }

    fn get_health_status(&self) -> GenerationHealth {
        let health = self.health();
        GenerationHealth {
            is_healthy: health.is_healthy,
            model_name: health.model_name,
        }
    }
}
