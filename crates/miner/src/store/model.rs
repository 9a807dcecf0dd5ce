//! Model — values crossing the store boundary.

use serde::{Deserialize, Serialize};
use sequence::PatternId;

/// A pattern as persisted: its text and the placeholder offsets it was
/// learned with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPattern {
    pub pattern: String,
    pub tag_offsets: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedPattern {
    pub id: PatternId,
    pub pattern: String,
    pub tag_offsets: Vec<usize>,
    pub complexity: f64,
    /// Learned in this batch rather than loaded from the store.
    pub discovered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineOutcome {
    pub message: String,
    pub matched: Option<MatchedPattern>,
}

/// Everything one service group produced in a batch, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub service: String,
    pub service_id: String,
    pub lines: Vec<LineOutcome>,
}

impl BatchResult {
    pub fn matched(&self) -> impl Iterator<Item = (&str, &MatchedPattern)> {
        self.lines
            .iter()
            .filter_map(|l| l.matched.as_ref().map(|m| (l.message.as_str(), m)))
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|l| l.matched.is_none())
            .map(|l| l.message.as_str())
    }
}
