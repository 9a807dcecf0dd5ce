//! Load — configuration loading from TOML files and the built-in default.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::SequenceConfig;
use crate::error::ConfigError;

const BUILTIN_CONFIG: &str = include_str!("default.toml");

impl SequenceConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        tracing::info!("Loading sequence configuration from: {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SequenceConfig = toml::from_str(contents)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// The configuration shipped with the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_str(BUILTIN_CONFIG)
    }
}
