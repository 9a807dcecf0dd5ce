//! Model — SequenceConfig and its sections, mirroring `sequence.toml`.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub version: String,
    /// Preserve the original spacing between tokens in pattern strings.
    pub mark_spaces: bool,
    /// Tag definitions as `name:type`, in id order.
    pub tags: Vec<String>,
    pub timesettings: TimeSettings,
    pub analyzer: AnalyzerSettings,
}

/// Timestamp layouts grouped by numeric id. A group with an entry in
/// `regex` produces `regextime` tokens carrying the group id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSettings {
    pub formats: BTreeMap<String, Vec<String>>,
    pub regex: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// tag name -> words that identify it when they precede a value
    pub keywords: BTreeMap<String, Vec<String>>,
    /// preceding word -> candidate tag names, first wins
    pub prekeys: BTreeMap<String, Vec<String>>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            mark_spaces: false,
            tags: Vec::new(),
            timesettings: TimeSettings::default(),
            analyzer: AnalyzerSettings::default(),
        }
    }
}

impl SequenceConfig {
    /// Validate shape constraints that do not need the registry.
    pub fn validate(&self) -> Result<(), String> {
        if self.version.is_empty() {
            return Err("version must not be empty".to_string());
        }
        for group in self.timesettings.formats.keys() {
            if group.parse::<u32>().is_err() {
                return Err(format!("timesettings.formats group '{}' is not numeric", group));
            }
        }
        for group in self.timesettings.regex.keys() {
            if !self.timesettings.formats.contains_key(group) {
                return Err(format!("timesettings.regex group '{}' has no formats", group));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_config_defaults() {
        let cfg = SequenceConfig::default();
        assert_eq!(cfg.version, "0.1");
        assert!(!cfg.mark_spaces);
        assert!(cfg.tags.is_empty());
        assert!(cfg.timesettings.formats.is_empty());
    }

    #[test]
    fn test_validate_default_passes() {
        assert!(SequenceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_numeric_group() {
        let mut cfg = SequenceConfig::default();
        cfg.timesettings.formats.insert("syslog".into(), vec!["Jan _2 15:04:05".into()]);
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("syslog"), "Error should name the group: {}", err);
    }

    #[test]
    fn test_validate_rejects_regex_without_formats() {
        let mut cfg = SequenceConfig::default();
        cfg.timesettings.regex.insert("7".into(), r"\d+".into());
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("7"));
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let toml_str = r#"
            mark_spaces = true
            tags = ["srcip:ipv4"]
        "#;
        let cfg: SequenceConfig = toml::from_str(toml_str).expect("Should accept partial TOML");
        assert!(cfg.mark_spaces);
        assert_eq!(cfg.tags, vec!["srcip:ipv4".to_string()]);
        assert_eq!(cfg.version, "0.1");
    }
}
