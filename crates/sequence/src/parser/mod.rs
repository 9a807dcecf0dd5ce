//! Parser — matches sequences against a corpus of known patterns.
//!
//! Patterns without variable-length placeholders live in a trie per token
//! count; patterns with `+`, `-` or `*` share one variadic trie. A sequence
//! is tried against its own length's trie and the variadic trie.

pub mod id;
pub(crate) mod matcher;
pub(crate) mod trie;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

pub use id::{pattern_id, service_id, PatternId};

use crate::error::ParseError;
use crate::registry::TagRegistry;
use crate::scanner::Scanner;
use crate::sequence::{Sequence, Token};
use matcher::Search;
use trie::Trie;

/// A registered pattern. Never mutated after registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub id: PatternId,
    pub text: String,
    pub tag_offsets: Vec<usize>,
    pub sequence: Sequence,
    /// Registration order, used to break ties.
    pub ordinal: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMatch {
    pub pattern_id: PatternId,
    pub pattern: String,
    pub tag_offsets: Vec<usize>,
    /// The input tokens, tagged by the placeholders that consumed them.
    pub sequence: Sequence,
}

#[derive(Debug)]
pub struct Parser {
    scanner: Scanner,
    patterns: Vec<Pattern>,
    by_text: HashMap<String, usize>,
    fixed: HashMap<usize, Trie>,
    variadic: Trie,
}

impl Parser {
    pub fn new(registry: Arc<TagRegistry>) -> Self {
        Self {
            scanner: Scanner::new(registry),
            patterns: Vec::new(),
            by_text: HashMap::new(),
            fixed: HashMap::new(),
            variadic: Trie::default(),
        }
    }

    pub fn registry(&self) -> &Arc<TagRegistry> {
        self.scanner.registry()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Register a tagged sequence. It must hold at least one plain literal.
    /// Registering the same pattern text again returns the existing id.
    pub fn add(&mut self, sequence: Sequence) -> Result<PatternId, ParseError> {
        self.register(sequence, None, true)
    }

    /// Scan pattern text and register it, remembering the placeholder
    /// offsets it was loaded with.
    pub fn add_text(&mut self, text: &str, offsets: &[usize]) -> Result<PatternId, ParseError> {
        let sequence = self.scanner.scan(text, true, offsets)?.sequence;
        self.register(sequence, Some(offsets.to_vec()), true)
    }

    pub(crate) fn add_unanchored(&mut self, sequence: Sequence) -> Result<PatternId, ParseError> {
        self.register(sequence, None, false)
    }

    fn register(
        &mut self,
        sequence: Sequence,
        offsets: Option<Vec<usize>>,
        require_anchor: bool,
    ) -> Result<PatternId, ParseError> {
        if sequence.is_empty() {
            return Err(ParseError::RegistrationConflict("pattern has no tokens".to_string()));
        }
        if require_anchor && !sequence.iter().any(Token::is_literal) {
            return Err(ParseError::RegistrationConflict(
                "pattern has no literal anchor".to_string(),
            ));
        }

        let (text, computed) = sequence.to_pattern_string(self.registry());
        if let Some(&existing) = self.by_text.get(&text) {
            return Ok(self.patterns[existing].id.clone());
        }

        let ordinal = self.patterns.len();
        let trie = if sequence.iter().any(|t| t.modifier.is_variable()) {
            &mut self.variadic
        } else {
            self.fixed.entry(sequence.len()).or_default()
        };
        if let Some(existing) = trie.insert(&sequence, ordinal) {
            debug!(pattern = %text, "pattern shadowed by an identical token path");
            return Ok(self.patterns[existing].id.clone());
        }

        let id = PatternId::of(&text);
        debug!(pattern = %text, id = %id, "registered pattern");
        self.by_text.insert(text.clone(), ordinal);
        self.patterns.push(Pattern {
            id: id.clone(),
            text,
            tag_offsets: offsets.unwrap_or(computed),
            sequence,
            ordinal,
        });
        Ok(id)
    }

    /// Find the registered pattern that best matches the whole sequence.
    pub fn parse(&self, sequence: &Sequence) -> Result<ParseMatch, ParseError> {
        if sequence.is_empty() || self.patterns.is_empty() {
            return Err(ParseError::NoMatch);
        }

        let mut search = Search::new(sequence.tokens(), self.registry().regextime());
        if let Some(trie) = self.fixed.get(&sequence.len()) {
            search.run(trie);
        }
        search.run(&self.variadic);

        let Some(best) = search.finish() else {
            trace!(tokens = sequence.len(), "no pattern matched");
            return Err(ParseError::NoMatch);
        };

        let pattern = &self.patterns[best.ordinal];
        let tagged = sequence
            .iter()
            .zip(&best.bindings)
            .map(|(token, slot)| {
                let mut token = token.clone();
                if let Some(slot) = slot {
                    token.tag = slot.tag;
                }
                token
            })
            .collect();

        Ok(ParseMatch {
            pattern_id: pattern.id.clone(),
            pattern: pattern.text.clone(),
            tag_offsets: pattern.tag_offsets.clone(),
            sequence: tagged,
        })
    }
}
