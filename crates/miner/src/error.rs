//! Error — failures of the batch runner around the mining core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinerError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Sequence configuration failed: {0}")]
    Sequence(#[from] sequence::ConfigError),

    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    Record(String),

    #[error("Store failed: {0}")]
    Store(String),

    #[error("Worker failed: {0}")]
    Worker(String),
}
