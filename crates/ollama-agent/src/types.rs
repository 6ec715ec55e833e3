use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ─── OllamaConfig ─────────────────────────────────────────────────────────

/// Connection and sampling settings for an [`OllamaClient`](crate::OllamaClient).
#[derive(Debug, Clone, PartialEq)]
pub struct OllamaConfig {
    /// Server root, e.g. `http://localhost:11434`. A trailing slash is ignored.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Maps to Ollama's `num_predict`.
    pub max_tokens: u32,
    /// Whole-request timeout, applied to every HTTP call.
    pub timeout: Duration,
    /// How many past turns are rendered into each prompt.
    pub max_context_turns: usize,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "llama3.2:3b".into(),
            temperature: 0.7,
            max_tokens: 2048,
            timeout: Duration::from_secs(120),
            max_context_turns: 6,
        }
    }
}

impl OllamaConfig {
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

// ─── ChatTurn ─────────────────────────────────────────────────────────────

/// A past exchange rendered into the prompt as conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub user: String,
    pub assistant: String,
}

// ─── /api/generate ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub stream: bool,
    pub options: GenerateOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub num_predict: u32,
}

/// One line of `/api/generate` output. Non-streaming calls return a single
/// chunk with `done = true`; streaming calls return one per fragment.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ─── /api/tags ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

impl TagsResponse {
    /// `llama3` matches an installed `llama3:latest` and vice versa.
    pub fn has_model(&self, wanted: &str) -> bool {
        let base = |name: &str| name.strip_suffix(":latest").unwrap_or(name).to_string();
        let wanted = base(wanted);
        self.models.iter().any(|m| base(&m.name) == wanted)
    }
}

// ─── HealthStatus ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub is_healthy: bool,
    pub model_name: String,
    pub last_check: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl HealthStatus {
    pub(crate) fn unknown(model_name: &str) -> Self {
        Self {
            is_healthy: false,
            model_name: model_name.to_string(),
            last_check: None,
            last_error: None,
        }
    }
}
