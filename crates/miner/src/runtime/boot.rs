//! Boot — logging init, config load, registry and state creation.

use std::sync::Arc;

use sequence::{SequenceConfig, TagRegistry};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::MinerConfig;
use crate::error::MinerError;
use crate::state::{MinerState, SharedState};

/// Initialise the tracing / logging subsystem.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "miner=info,sequence=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load config, build the tag registry and the shared state.
pub async fn boot() -> Result<(SharedState, MinerConfig), Box<dyn std::error::Error>> {
    info!("Starting template miner v{}", env!("CARGO_PKG_VERSION"));

    let config = MinerConfig::load()?;
    info!(
        "Loaded configuration: input_format={}, batch_size={}, max_workers={}",
        config.input_format, config.batch_size, config.max_workers
    );

    let registry = load_registry(&config).map_err(|e| {
        error!("Failed to build tag registry: {}", e);
        e
    })?;
    info!("Tag registry ready with {} tags", registry.len());

    let state = Arc::new(MinerState::new(registry, config.clone()));
    Ok((state, config))
}

/// The registry from the configured sequence file, or the built-in one.
pub fn load_registry(config: &MinerConfig) -> Result<Arc<TagRegistry>, MinerError> {
    let sequence_config = match &config.sequence_config {
        Some(path) => SequenceConfig::from_file(path)?,
        None => SequenceConfig::builtin()?,
    };
    Ok(Arc::new(TagRegistry::from_config(&sequence_config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_registry_without_path() {
        let registry = load_registry(&MinerConfig::default()).unwrap();
        assert!(!registry.is_empty());
        assert!(registry.tag("srcip").is_some());
    }

    #[test]
    fn test_registry_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tags = [\"appname:string\", \"srcport:integer\"]").unwrap();
        let config = MinerConfig {
            sequence_config: Some(file.path().display().to_string()),
            ..Default::default()
        };
        let registry = load_registry(&config).unwrap();
        assert!(registry.tag("srcport").is_some());
        assert!(registry.tag("srcip").is_none());
    }

    #[test]
    fn test_missing_sequence_file() {
        let config = MinerConfig {
            sequence_config: Some("/nonexistent/sequence.toml".to_string()),
            ..Default::default()
        };
        assert!(matches!(load_registry(&config), Err(MinerError::Sequence(_))));
    }
}
