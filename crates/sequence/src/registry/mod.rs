//! Registry — the immutable vocabulary every pipeline stage shares.
//!
//! Maps tag names to ids and default types, holds the analyzer's keyword and
//! preceding-word tables, and owns the compiled timestamp matcher. Built once
//! from a [`SequenceConfig`] and handed around behind an `Arc`.

pub mod types;

use std::collections::HashMap;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use tracing::{debug, warn};

pub use types::{TagType, TokenType};

use crate::conf::SequenceConfig;
use crate::error::ConfigError;
use crate::scanner::time_fsm::{TimeGroup, TimeMatcher};

const UNKNOWN_TAG_NAME: &str = "funknown";
const REGEXTIME_TAG_NAME: &str = "regextime";
const MULTILINE_TAG_NAME: &str = "multiline";

#[derive(Debug)]
pub struct TagRegistry {
    names: Vec<String>,
    types: Vec<TokenType>,
    ids: HashMap<String, TagType>,
    keywords: HashMap<String, TagType>,
    prekeys: HashMap<String, Vec<TagType>>,
    time: TimeMatcher,
    stemmer: KeywordStemmer,
    mark_spaces: bool,
    regextime: TagType,
    multiline: TagType,
}

impl TagRegistry {
    /// Build a registry from configuration. Malformed tag entries and
    /// invalid timestamp regexes are errors; keyword or prekey entries that
    /// name unknown tags are skipped with a warning.
    pub fn from_config(config: &SequenceConfig) -> Result<Self, ConfigError> {
        config.validate().map_err(ConfigError::Invalid)?;

        let mut registry = TagRegistry {
            names: vec![UNKNOWN_TAG_NAME.to_string()],
            types: vec![TokenType::Unknown],
            ids: HashMap::new(),
            keywords: HashMap::new(),
            prekeys: HashMap::new(),
            time: TimeMatcher::default(),
            stemmer: KeywordStemmer::english(),
            mark_spaces: config.mark_spaces,
            regextime: TagType::UNKNOWN,
            multiline: TagType::UNKNOWN,
        };

        for entry in &config.tags {
            let (name, ty) = parse_tag_entry(entry)?;
            registry.insert_tag(name, ty)?;
        }
        registry.regextime = registry.ensure_tag(REGEXTIME_TAG_NAME, TokenType::Time)?;
        registry.multiline = registry.ensure_tag(MULTILINE_TAG_NAME, TokenType::MultiLine)?;

        registry.load_keywords(config);
        registry.load_prekeys(config);
        registry.time = build_time_matcher(config)?;

        debug!(
            tags = registry.names.len() - 1,
            keywords = registry.keywords.len(),
            prekeys = registry.prekeys.len(),
            "tag registry built"
        );
        Ok(registry)
    }

    /// Registry for the configuration shipped with the crate.
    pub fn builtin() -> Self {
        SequenceConfig::builtin()
            .and_then(|config| Self::from_config(&config))
            .expect("built-in sequence configuration is valid")
    }

    // ── Tags ────────────────────────────────────────────────────

    pub fn tag(&self, name: &str) -> Option<TagType> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, tag: TagType) -> Option<&str> {
        self.names.get(tag.0 as usize).map(String::as_str)
    }

    /// Default type of a tag; `Unknown` for ids the registry never issued.
    pub fn default_type(&self, tag: TagType) -> TokenType {
        self.types
            .get(tag.0 as usize)
            .copied()
            .unwrap_or(TokenType::Unknown)
    }

    /// Number of known tags, `funknown` excluded.
    pub fn len(&self) -> usize {
        self.names.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn regextime(&self) -> TagType {
        self.regextime
    }

    pub fn multiline(&self) -> TagType {
        self.multiline
    }

    pub fn mark_spaces(&self) -> bool {
        self.mark_spaces
    }

    pub(crate) fn time(&self) -> &TimeMatcher {
        &self.time
    }

    // ── Analyzer lookups ────────────────────────────────────────

    /// Tag identified by a keyword, matched on its stem.
    pub fn keyword(&self, word: &str) -> Option<TagType> {
        self.keywords.get(&self.stemmer.stem(word)).copied()
    }

    /// Candidate tags for a value preceded by `word`, in preference order.
    pub fn prekey(&self, word: &str) -> &[TagType] {
        self.prekeys
            .get(&word.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ── Construction helpers ────────────────────────────────────

    fn insert_tag(&mut self, name: &str, ty: TokenType) -> Result<TagType, ConfigError> {
        if self.ids.contains_key(name) {
            return Err(ConfigError::InvalidTag(format!("duplicate tag '{}'", name)));
        }
        let id = TagType(self.names.len() as u32);
        self.names.push(name.to_string());
        self.types.push(ty);
        self.ids.insert(name.to_string(), id);
        Ok(id)
    }

    fn ensure_tag(&mut self, name: &str, ty: TokenType) -> Result<TagType, ConfigError> {
        match self.tag(name) {
            Some(id) if self.default_type(id) == ty => Ok(id),
            Some(_) => Err(ConfigError::InvalidTag(format!(
                "tag '{}' must have type {}",
                name, ty
            ))),
            None => self.insert_tag(name, ty),
        }
    }

    fn load_keywords(&mut self, config: &SequenceConfig) {
        for (tag_name, words) in &config.analyzer.keywords {
            let Some(tag) = self.tag(tag_name) else {
                warn!("Skipping keywords for unknown tag: {}", tag_name);
                continue;
            };
            for word in words {
                let key = self.stemmer.stem(word);
                self.keywords.entry(key).or_insert(tag);
            }
        }
    }

    fn load_prekeys(&mut self, config: &SequenceConfig) {
        for (word, tag_names) in &config.analyzer.prekeys {
            let mut tags = Vec::with_capacity(tag_names.len());
            for tag_name in tag_names {
                match self.tag(tag_name) {
                    Some(tag) => tags.push(tag),
                    None => warn!("Skipping unknown tag '{}' in prekey '{}'", tag_name, word),
                }
            }
            if !tags.is_empty() {
                self.prekeys.insert(word.to_lowercase(), tags);
            }
        }
    }
}

fn parse_tag_entry(entry: &str) -> Result<(&str, TokenType), ConfigError> {
    let (name, ty) = entry
        .split_once(':')
        .ok_or_else(|| ConfigError::InvalidTag(format!("'{}' is not name:type", entry)))?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::InvalidTag(format!("invalid tag name in '{}'", entry)));
    }
    match TokenType::from_name(ty) {
        Some(ty) if ty != TokenType::Unknown => Ok((name, ty)),
        _ => Err(ConfigError::InvalidTag(format!("unknown type in '{}'", entry))),
    }
}

fn build_time_matcher(config: &SequenceConfig) -> Result<TimeMatcher, ConfigError> {
    let mut groups = Vec::with_capacity(config.timesettings.formats.len());
    for (group, layouts) in &config.timesettings.formats {
        let id: u32 = group.parse().map_err(|_| {
            ConfigError::Invalid(format!("timesettings group '{}' is not numeric", group))
        })?;
        let regex = match config.timesettings.regex.get(group) {
            Some(pattern) => Some(
                Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
                    ConfigError::InvalidRegex { group: group.clone(), source }
                })?,
            ),
            None => None,
        };
        groups.push(TimeGroup { id, layouts: layouts.clone(), regex });
    }
    Ok(TimeMatcher::build(groups))
}

/// English Porter2 stemmer, built once per registry.
struct KeywordStemmer(Stemmer);

impl KeywordStemmer {
    fn english() -> Self {
        Self(Stemmer::create(Algorithm::English))
    }

    /// Stem of the lower-cased word.
    fn stem(&self, word: &str) -> String {
        self.0.stem(&word.to_lowercase()).into_owned()
    }
}

impl std::fmt::Debug for KeywordStemmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeywordStemmer(English)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(tags: &[&str]) -> SequenceConfig {
        SequenceConfig {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ids_follow_configuration_order() {
        let reg = TagRegistry::from_config(&config(&["srcip:ipv4", "srcport:integer"])).unwrap();
        assert_eq!(reg.tag("srcip"), Some(TagType(1)));
        assert_eq!(reg.tag("srcport"), Some(TagType(2)));
        assert_eq!(reg.name(TagType(1)), Some("srcip"));
        assert_eq!(reg.default_type(TagType(2)), TokenType::Integer);
    }

    #[test]
    fn test_unknown_tag_is_reserved() {
        let reg = TagRegistry::from_config(&config(&[])).unwrap();
        assert_eq!(reg.name(TagType::UNKNOWN), Some("funknown"));
        assert_eq!(reg.default_type(TagType(999)), TokenType::Unknown);
    }

    #[test]
    fn test_regextime_and_multiline_always_known() {
        let reg = TagRegistry::from_config(&config(&["srcip:ipv4"])).unwrap();
        assert_eq!(reg.default_type(reg.regextime()), TokenType::Time);
        assert_eq!(reg.default_type(reg.multiline()), TokenType::MultiLine);
        assert_eq!(reg.tag("regextime"), Some(reg.regextime()));
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_configured_regextime_position_wins() {
        let reg = TagRegistry::from_config(&config(&["regextime:time", "srcip:ipv4"])).unwrap();
        assert_eq!(reg.regextime(), TagType(1));
    }

    #[test]
    fn test_identical_config_identical_ids() {
        let a = TagRegistry::builtin();
        let b = TagRegistry::builtin();
        for name in ["srcip", "dstport", "regextime", "reason"] {
            assert_eq!(a.tag(name), b.tag(name));
        }
    }

    #[test]
    fn test_malformed_tag_entry_rejected() {
        let err = TagRegistry::from_config(&config(&["srcip"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTag(_)));
        let err = TagRegistry::from_config(&config(&["srcip:bogus"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTag(_)));
        let err = TagRegistry::from_config(&config(&["src ip:ipv4"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTag(_)));
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let err = TagRegistry::from_config(&config(&["a:string", "a:integer"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTag(_)));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let mut cfg = config(&[]);
        cfg.timesettings.formats.insert("1".into(), vec!["Jan _2".into()]);
        cfg.timesettings.regex.insert("1".into(), "([".into());
        let err = TagRegistry::from_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegex { .. }));
    }

    #[test]
    fn test_keywords_are_stemmed() {
        let mut cfg = config(&["action:string"]);
        cfg.analyzer.keywords.insert("action".into(), vec!["accepted".into()]);
        let reg = TagRegistry::from_config(&cfg).unwrap();
        let action = reg.tag("action");
        assert_eq!(reg.keyword("accepting"), action);
        assert_eq!(reg.keyword("Accepts"), action);
        assert_eq!(reg.keyword("denied"), None);
    }

    #[test]
    fn test_shared_stemmer_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TagRegistry>();

        let reg = std::sync::Arc::new(TagRegistry::builtin());
        let expected = reg.keyword("failed");
        assert!(expected.is_some());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let reg = reg.clone();
                std::thread::spawn(move || reg.keyword("failing"))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
        assert_eq!(reg.stemmer.stem("Failures"), reg.stemmer.stem("failure"));
        assert!(format!("{:?}", reg).contains("KeywordStemmer"));
    }

    #[test]
    fn test_unknown_tags_in_tables_are_skipped() {
        let mut cfg = config(&["srcport:integer"]);
        cfg.analyzer.keywords.insert("nosuch".into(), vec!["word".into()]);
        cfg.analyzer.prekeys.insert("port".into(), vec!["nosuch".into(), "srcport".into()]);
        let reg = TagRegistry::from_config(&cfg).unwrap();
        assert_eq!(reg.keyword("word"), None);
        assert_eq!(reg.prekey("PORT"), &[reg.tag("srcport").unwrap()]);
        assert!(reg.prekey("other").is_empty());
    }

    #[test]
    fn test_builtin_registry() {
        let reg = TagRegistry::builtin();
        assert!(!reg.mark_spaces());
        assert_eq!(reg.default_type(reg.tag("srcmac").unwrap()), TokenType::Mac);
        assert!(!reg.prekey("sport").is_empty());
    }
}
