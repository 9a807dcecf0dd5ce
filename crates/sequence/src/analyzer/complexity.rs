//! Complexity — how much of a pattern is wildcard.

use crate::sequence::Sequence;

/// Fraction of tokens that are placeholders: 0.0 for an all-literal
/// pattern, 1.0 for one with no literal anchor. 0.0 for an empty sequence.
pub fn complexity_score(sequence: &Sequence) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    let placeholders = sequence.iter().filter(|t| t.is_placeholder()).count();
    placeholders as f64 / sequence.len() as f64
}
