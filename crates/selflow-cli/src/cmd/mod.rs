pub mod chat;
pub mod command;
pub mod config;
pub mod serve;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use selflow_brain::CentralBrain;
use selflow_core::BrainConfig;

/// Global flags that shape the brain config.
pub struct Settings {
    pub config: Option<PathBuf>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl Settings {
    /// Load the config file (or defaults) and apply command-line overrides.
    pub fn load_config(&self) -> anyhow::Result<BrainConfig> {
        let mut config =
            BrainConfig::load_or_default(self.config.as_deref()).context("failed to load config")?;
        if let Some(model) = &self.model {
            config.ai_brain.model_name = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.ai_brain.base_url = base_url.clone();
        }
        Ok(config)
    }

    pub fn brain(&self) -> anyhow::Result<Arc<CentralBrain>> {
        Ok(Arc::new(CentralBrain::builder(self.load_config()?).build()))
    }
}

pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start the async runtime")
}

/// Start the brain, tolerating failure so read-only commands can still
/// report on a brain that could not come up.
pub async fn try_start(brain: &CentralBrain) {
    if let Err(failure) = brain.start().await {
        tracing::warn!(error = %failure, "central brain did not start");
    }
}
