use crate::error::{BrainError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// GenerationConfig
// ---------------------------------------------------------------------------

/// Settings for the language-model backend (`ai_brain` section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout. The brain itself defines no timeouts.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model_name() -> String {
    "llama3.2:3b".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model_name: default_model_name(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

// ---------------------------------------------------------------------------
// ContextConfig
// ---------------------------------------------------------------------------

/// Settings for the conversational context store (`context_management`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Turns retained by the in-memory store.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Turns included in each generation request.
    #[serde(default = "default_max_context_turns")]
    pub max_context_turns: usize,
}

fn default_max_history() -> usize {
    20
}

fn default_max_context_turns() -> usize {
    6
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            max_context_turns: default_max_context_turns(),
        }
    }
}

// ---------------------------------------------------------------------------
// BrainConfig (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrainConfig {
    #[serde(default)]
    pub ai_brain: GenerationConfig,
    #[serde(default)]
    pub context_management: ContextConfig,
}

impl BrainConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BrainError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: BrainConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, data)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let ai = &self.ai_brain;

        if ai.model_name.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "ai_brain.model_name is empty".to_string(),
            });
        }

        if !(ai.base_url.starts_with("http://") || ai.base_url.starts_with("https://")) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("ai_brain.base_url '{}' is not an http(s) URL", ai.base_url),
            });
        }

        if !(0.0..=2.0).contains(&ai.temperature) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "ai_brain.temperature {} is outside the usual 0.0–2.0 range",
                    ai.temperature
                ),
            });
        }

        if ai.timeout_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "ai_brain.timeout_seconds is 0: requests will fail immediately"
                    .to_string(),
            });
        }

        let ctx = &self.context_management;
        if ctx.max_history == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "context_management.max_history is 0: no conversation is retained"
                    .to_string(),
            });
        }
        if ctx.max_context_turns > ctx.max_history {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "context_management.max_context_turns ({}) exceeds max_history ({})",
                    ctx.max_context_turns, ctx.max_history
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = BrainConfig::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: BrainConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "ai_brain:\n  model_name: mistral:7b\n";
        let cfg: BrainConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.ai_brain.model_name, "mistral:7b");
        assert_eq!(cfg.ai_brain.base_url, "http://localhost:11434");
        assert_eq!(cfg.context_management.max_history, 20);
    }

    #[test]
    fn empty_yaml_is_default() {
        let cfg: BrainConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, BrainConfig::default());
    }

    #[test]
    fn load_missing_file_is_config_not_found() {
        let dir = TempDir::new().unwrap();
        let err = BrainConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, BrainError::ConfigNotFound(_)));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("selflow.yaml");
        let mut cfg = BrainConfig::default();
        cfg.ai_brain.temperature = 0.2;
        cfg.save(&path).unwrap();
        assert_eq!(BrainConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn load_or_default_without_path() {
        let cfg = BrainConfig::load_or_default(None).unwrap();
        assert_eq!(cfg, BrainConfig::default());
    }

    #[test]
    fn default_config_has_no_warnings() {
        assert!(BrainConfig::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut cfg = BrainConfig::default();
        cfg.ai_brain.model_name = " ".into();
        cfg.ai_brain.base_url = "localhost:11434".into();
        cfg.ai_brain.temperature = 3.5;
        cfg.context_management.max_history = 2;
        let warnings = cfg.validate();
        let errors = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .count();
        assert_eq!(errors, 2);
        assert!(warnings.iter().any(|w| w.message.contains("temperature")));
        assert!(warnings.iter().any(|w| w.message.contains("exceeds max_history")));
    }
}
