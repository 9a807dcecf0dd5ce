//! Id — stable SHA-256 identifiers for patterns and services.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Lower-case hex SHA-256 of a pattern string. Identical text yields the
/// same id on every run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternId(String);

impl PatternId {
    pub fn of(pattern: &str) -> Self {
        Self(hex_digest(pattern.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Id of a pattern within one service, so the same text learned for two
/// services stays distinct.
pub fn pattern_id(pattern: &str, service: &str) -> PatternId {
    let mut hasher = Sha256::new();
    hasher.update(service.as_bytes());
    hasher.update(pattern.as_bytes());
    PatternId(format!("{:x}", hasher.finalize()))
}

pub fn service_id(name: &str) -> String {
    hex_digest(name.as_bytes())
}

fn hex_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
