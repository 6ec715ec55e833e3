//! Command translator output contract.
//!
//! A [`SystemAction`] is the structured description of a candidate
//! state-changing operation. Its [`Disposition`] is the only field the brain
//! reads; everything else travels opaquely to the action executor.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::BrainError;

// ---------------------------------------------------------------------------
// Disposition
// ---------------------------------------------------------------------------

/// The translator's safety recommendation for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Execute,
    RequestConfirmation,
    RequestClarification,
    Deny,
}

/// What the command pipeline does with an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Forward to the action executor.
    Execute,
    /// Return to the caller for confirmation or clarification.
    AwaitUserInput,
    /// Refuse without executing.
    Refuse,
}

impl Disposition {
    pub fn all() -> &'static [Disposition] {
        &[
            Disposition::Execute,
            Disposition::RequestConfirmation,
            Disposition::RequestClarification,
            Disposition::Deny,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Execute => "execute",
            Disposition::RequestConfirmation => "request_confirmation",
            Disposition::RequestClarification => "request_clarification",
            Disposition::Deny => "deny",
        }
    }

    /// The decision table of the command pipeline.
    pub fn gate(self) -> Gate {
        match self {
            Disposition::Execute => Gate::Execute,
            Disposition::RequestConfirmation | Disposition::RequestClarification => {
                Gate::AwaitUserInput
            }
            Disposition::Deny => Gate::Refuse,
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Disposition {
    type Err = BrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "execute" => Ok(Disposition::Execute),
            "request_confirmation" => Ok(Disposition::RequestConfirmation),
            "request_clarification" => Ok(Disposition::RequestClarification),
            "deny" => Ok(Disposition::Deny),
            _ => Err(BrainError::ContractViolation(format!(
                "unrecognized recommended_action '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// SystemAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemAction {
    pub action_id: String,
    pub recommended_action: Disposition,
    /// Explanation of the recommendation, shown to the user verbatim.
    pub user_feedback: String,
    /// Executor-specific payload. The brain never looks inside.
    #[serde(default)]
    pub details: serde_json::Value,
}

impl SystemAction {
    /// Create an action with a freshly minted id and no details.
    pub fn new(recommended_action: Disposition, user_feedback: impl Into<String>) -> Self {
        Self {
            action_id: Uuid::new_v4().to_string(),
            recommended_action,
            user_feedback: user_feedback.into(),
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Parse translator output that arrived as loosely-typed JSON.
    ///
    /// An unknown or missing disposition is a contract violation, never a
    /// silent default.
    pub fn from_value(value: serde_json::Value) -> crate::Result<Self> {
        let disposition = value
            .get("recommended_action")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                BrainError::ContractViolation("missing recommended_action".to_string())
            })?;
        disposition.parse::<Disposition>()?;
        serde_json::from_value(value).map_err(|e| BrainError::ContractViolation(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
