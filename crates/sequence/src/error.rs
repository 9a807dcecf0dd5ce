//! Error — failure types for every stage of the pipeline.
//!
//! `NoMatch` is an expected outcome for unmatched lines, not a fault; callers
//! route it onward instead of logging it.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Malformed pattern text: {0}")]
    Structural(String),
    #[error("Invalid JSON message: {0}")]
    Json(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No registered pattern matches the sequence")]
    NoMatch,
    #[error("Pattern rejected: {0}")]
    RegistrationConflict(String),
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    #[error("No generalized pattern matches the sequence")]
    NoMatch,
    #[error("Analyzer rejected the request: {0}")]
    RegistrationConflict(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid tag definition: {0}")]
    InvalidTag(String),
    #[error("Invalid timestamp regex for group {group}: {source}")]
    InvalidRegex {
        group: String,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_converts_into_parse_error() {
        let err: ParseError = ScanError::Structural("bad".into()).into();
        assert_eq!(err, ParseError::Scan(ScanError::Structural("bad".into())));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_config_error_display_names_group() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ConfigError::InvalidRegex { group: "4".into(), source };
        assert!(err.to_string().contains("group 4"));
    }
}
