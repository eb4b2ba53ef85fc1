//! Configuration for the analysis engine
//!
//! Loaded from YAML or JSON. Everything defaults: an empty config enables
//! every registered rule at its default severity, warn-and-placeholder
//! conversion, and parallel batch analysis.

use crate::convert::ConvertOptions;
use crate::diagnostic::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Analyze batch inputs in parallel
    pub parallel: bool,

    /// Number of parallel jobs (0 = auto-detect)
    pub jobs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            jobs: 0,
        }
    }
}

/// Converter settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Abort conversion on an unmodeled native kind instead of substituting
    /// a placeholder and warning
    pub abort_on_unsupported: bool,
}

/// Per-rule override
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOverride {
    /// Whether the rule runs at all
    pub enabled: bool,

    /// Severity replacing the rule's default
    pub severity: Option<Severity>,
}

impl Default for RuleOverride {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: None,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine settings
    pub engine: EngineConfig,

    /// Converter settings
    pub converter: ConverterConfig,

    /// Collapse diagnostics identical in (rule id, range, message)
    pub dedup: bool,

    /// Per-rule overrides keyed by rule id
    pub rules: HashMap<String, RuleOverride>,
}

impl Config {
    /// Parse from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse from JSON text
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a file, dispatching on extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("json") => Self::from_json(&content),
            other => Err(ConfigError::Invalid(format!(
                "unsupported config extension: {:?}",
                other
            ))),
        }
    }

    /// Whether a rule should run
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        self.rules.get(rule_id).map_or(true, |r| r.enabled)
    }

    /// Severity override for a rule, if configured
    pub fn severity_override(&self, rule_id: &str) -> Option<Severity> {
        self.rules.get(rule_id).and_then(|r| r.severity)
    }

    /// Converter options derived from this config
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            abort_on_unsupported: self.converter.abort_on_unsupported,
        }
    }
}
