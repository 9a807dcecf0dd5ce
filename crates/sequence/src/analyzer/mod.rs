//! Analyzer — discovers patterns from a batch of unmatched sequences.
//!
//! Sequences are buffered into buckets by token count and signature.
//! `finalize` turns each bucket into one generalized pattern; afterwards
//! `analyze` maps a sequence to the pattern of its bucket. Adding is only
//! possible before finalizing.

mod complexity;
mod consensus;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, trace};

pub use complexity::complexity_score;

use crate::error::AnalyzeError;
use crate::parser::Parser;
use crate::registry::TagRegistry;
use crate::sequence::Sequence;

/// Coefficient of variation of value lengths above which a trailing
/// placeholder becomes a run to the end of the line.
pub const TAIL_VARIATION_THRESHOLD: f64 = 0.5;

/// Token count plus [`Sequence::signature`].
type BucketKey = (usize, String);

fn bucket_key(sequence: &Sequence) -> BucketKey {
    (sequence.len(), sequence.signature())
}

#[derive(Debug)]
struct Bucket {
    parser: Parser,
    pattern: usize,
}

#[derive(Debug)]
struct Finalized {
    patterns: Vec<Sequence>,
    buckets: HashMap<BucketKey, Bucket>,
}

#[derive(Debug)]
pub struct Analyzer {
    registry: Arc<TagRegistry>,
    pending: BTreeMap<BucketKey, Vec<Sequence>>,
    finalized: Option<Finalized>,
}

impl Analyzer {
    pub fn new(registry: Arc<TagRegistry>) -> Self {
        Self {
            registry,
            pending: BTreeMap::new(),
            finalized: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }

    /// Number of buffered sequences.
    pub fn len(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Generalized patterns, once finalized.
    pub fn patterns(&self) -> Option<&[Sequence]> {
        self.finalized.as_ref().map(|f| f.patterns.as_slice())
    }

    pub fn add(&mut self, sequence: Sequence) -> Result<(), AnalyzeError> {
        if self.finalized.is_some() {
            return Err(AnalyzeError::RegistrationConflict(
                "analyzer is already finalized".to_string(),
            ));
        }
        if sequence.is_empty() {
            return Err(AnalyzeError::RegistrationConflict("sequence has no tokens".to_string()));
        }
        self.pending.entry(bucket_key(&sequence)).or_default().push(sequence);
        Ok(())
    }

    /// Generalize every bucket. Repeated calls return the same patterns.
    pub fn finalize(&mut self) -> Result<&[Sequence], AnalyzeError> {
        let finalized = match self.finalized.take() {
            Some(finalized) => finalized,
            None => self.build()?,
        };
        Ok(&self.finalized.insert(finalized).patterns)
    }

    fn build(&self) -> Result<Finalized, AnalyzeError> {
        if self.pending.is_empty() {
            return Err(AnalyzeError::RegistrationConflict(
                "nothing to finalize".to_string(),
            ));
        }

        let mut patterns: Vec<Sequence> = Vec::new();
        let mut by_text: HashMap<String, usize> = HashMap::new();
        let mut buckets = HashMap::with_capacity(self.pending.len());

        for (key, sequences) in &self.pending {
            let pattern = consensus::generalize(sequences, &self.registry);
            let (text, _) = pattern.to_pattern_string(&self.registry);
            trace!(
                len = key.0,
                signature = %key.1,
                sequences = sequences.len(),
                pattern = %text,
                "generalized bucket"
            );

            let idx = *by_text.entry(text).or_insert_with(|| {
                patterns.push(pattern);
                patterns.len() - 1
            });
            let mut parser = Parser::new(self.registry.clone());
            parser
                .add_unanchored(patterns[idx].clone())
                .map_err(|e| AnalyzeError::RegistrationConflict(e.to_string()))?;
            buckets.insert(key.clone(), Bucket { parser, pattern: idx });
        }

        debug!(buckets = buckets.len(), patterns = patterns.len(), "analyzer finalized");
        Ok(Finalized { patterns, buckets })
    }

    /// The generalized pattern accepting `sequence`.
    pub fn analyze(&self, sequence: &Sequence) -> Result<Sequence, AnalyzeError> {
        let finalized = self.finalized.as_ref().ok_or(AnalyzeError::NoMatch)?;
        let bucket = finalized
            .buckets
            .get(&bucket_key(sequence))
            .ok_or(AnalyzeError::NoMatch)?;
        bucket.parser.parse(sequence).map_err(|_| AnalyzeError::NoMatch)?;
        Ok(finalized.patterns[bucket.pattern].clone())
    }
}
