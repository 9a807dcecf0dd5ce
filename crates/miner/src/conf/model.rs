//! Model — MinerConfig and related types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How input lines are framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// `service message...`
    #[default]
    Text,
    /// `{"service": "...", "message": "..."}`
    Json,
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(InputFormat::Text),
            "json" => Ok(InputFormat::Json),
            other => Err(format!("unknown input format '{}'", other)),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Text => f.write_str("text"),
            InputFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Path to a sequence TOML; the built-in configuration when unset.
    pub sequence_config: Option<String>,
    pub input_format: InputFormat,
    /// Records per batch. 0 reads the whole input as one batch.
    pub batch_size: usize,
    /// Service groups processed concurrently.
    pub max_workers: usize,
    /// Example lines kept per pattern.
    pub max_examples: usize,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            sequence_config: None,
            input_format: InputFormat::Text,
            batch_size: 10_000,
            max_workers: 4,
            max_examples: 5,
        }
    }
}

impl MinerConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max_workers must be > 0".to_string());
        }
        if let Some(path) = &self.sequence_config {
            if path.is_empty() {
                return Err("sequence_config path is empty".to_string());
            }
        }
        Ok(())
    }
}
