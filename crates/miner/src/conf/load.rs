//! Load — config loading from file and environment variables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::MinerConfig;
use crate::error::MinerError;

const DEFAULT_CONFIG_PATH: &str = "/etc/miner/miner.toml";

impl MinerConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, MinerError> {
        let config_path = std::env::var("MINER_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::info!("Config file not found at {}, using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate().map_err(MinerError::Config)?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MinerError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: MinerConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply `MINER_*` overrides. Unparseable values keep the current setting.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("MINER_SEQUENCE_CONFIG") {
            self.sequence_config = Some(path);
        }
        self.batch_size = lookup("MINER_BATCH_SIZE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.batch_size);
        self.max_workers = lookup("MINER_MAX_WORKERS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.max_workers);
        self.max_examples = lookup("MINER_MAX_EXAMPLES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.max_examples);
        self.input_format = lookup("MINER_INPUT_FORMAT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.input_format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::InputFormat;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = 250\nmax_workers = 2").unwrap();
        let cfg = MinerConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.batch_size, 250);
        assert_eq!(cfg.max_workers, 2);
        assert_eq!(cfg.input_format, InputFormat::Text);
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let err = MinerConfig::from_file("/nonexistent/miner.toml").unwrap_err();
        assert!(matches!(err, MinerError::Io(_)));
    }

    #[test]
    fn test_from_file_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = \"many\"").unwrap();
        let err = MinerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, MinerError::Toml(_)));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut cfg = MinerConfig {
            batch_size: 100,
            ..Default::default()
        };
        cfg.apply_overrides(env(&[
            ("MINER_BATCH_SIZE", "0"),
            ("MINER_MAX_WORKERS", "8"),
            ("MINER_INPUT_FORMAT", "json"),
            ("MINER_SEQUENCE_CONFIG", "/tmp/sequence.toml"),
        ]));
        assert_eq!(cfg.batch_size, 0);
        assert_eq!(cfg.max_workers, 8);
        assert_eq!(cfg.input_format, InputFormat::Json);
        assert_eq!(cfg.sequence_config.as_deref(), Some("/tmp/sequence.toml"));
    }

    #[test]
    fn test_unparseable_override_keeps_value() {
        let mut cfg = MinerConfig::default();
        cfg.apply_overrides(env(&[("MINER_MAX_WORKERS", "lots"), ("MINER_INPUT_FORMAT", "xml")]));
        assert_eq!(cfg.max_workers, 4);
        assert_eq!(cfg.input_format, InputFormat::Text);
    }
}
