use thiserror::Error;

use crate::types::Capability;

#[derive(Debug, Error)]
pub enum BrainError {
    #[error("Central AI Brain is not running")]
    NotRunning,

    #[error("{0} not available")]
    Unavailable(Capability),

    #[error("{capability} failed: {message}")]
    Collaborator {
        capability: Capability,
        message: String,
    },

    #[error("command translator contract violation: {0}")]
    ContractViolation(String),

    #[error("generation client is not healthy: {0}")]
    Unhealthy(String),

    #[error("config not found: {0}")]
    ConfigNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BrainError {
    pub fn collaborator(capability: Capability, message: impl Into<String>) -> Self {
        Self::Collaborator {
            capability,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BrainError>;
