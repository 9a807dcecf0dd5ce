//! Scanner — turns raw text into a typed token sequence.
//!
//! Three state machines race at every token start: timestamps, colon hex
//! runs (MAC / IPv6) and general words. Time wins over hex, hex over words.
//! In pattern mode `%…%` runs become placeholder tokens.

pub(crate) mod hex_fsm;
pub(crate) mod time_fsm;
pub(crate) mod token_fsm;
mod json;

use std::sync::Arc;

use tracing::trace;

use crate::error::ScanError;
use crate::registry::{TagRegistry, TokenType};
use crate::sequence::grammar::{parse_placeholder, placeholder_run};
use crate::sequence::{Sequence, Token};
use hex_fsm::HexKind;
use token_fsm::QuoteState;

/// Result of one state-machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Continue,
    Reject,
    /// Match of this many bytes.
    Accept(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    pub sequence: Sequence,
    /// The text looked like a JSON object.
    pub is_json: bool,
}

#[derive(Debug, Clone)]
pub struct Scanner {
    registry: Arc<TagRegistry>,
}

impl Scanner {
    pub fn new(registry: Arc<TagRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<TagRegistry> {
        &self.registry
    }

    /// Tokenize `text`. With `is_pattern_text`, `%…%` runs with a valid body
    /// become placeholders. When every offset in `placeholder_offsets` starts
    /// such a run, only the listed runs are placeholders and each forces a
    /// token boundary; an empty or stale list makes every valid run a
    /// placeholder. A listed run whose body is invalid is a structural error.
    ///
    /// In mark-spaces mode each whitespace run is emitted as its own literal
    /// token.
    pub fn scan(
        &self,
        text: &str,
        is_pattern_text: bool,
        placeholder_offsets: &[usize],
    ) -> Result<Scan, ScanError> {
        let (anchors, listed_only) = if is_pattern_text {
            self.anchors(text, placeholder_offsets)?
        } else {
            (Vec::new(), false)
        };

        let registry = &*self.registry;
        let mut quote = QuoteState::default();
        let mut prev = TokenType::Unknown;
        let mut tokens: Vec<Token> = Vec::new();
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];
            let trimmed = rest.trim_start();
            let skipped = &rest[..rest.len() - trimmed.len()];
            pos += skipped.len();
            let multiline = skipped.contains('\n') && !quote.is_open() && !tokens.is_empty();
            if registry.mark_spaces() && !skipped.is_empty() && !multiline {
                tokens.push(Token::literal(skipped));
            }
            if trimmed.is_empty() {
                break;
            }
            let space_before = !skipped.is_empty();

            if multiline {
                if registry.mark_spaces() {
                    tokens.push(Token::literal(" "));
                }
                let mut token = Token::new(trimmed.trim_end(), TokenType::MultiLine);
                token.space_before = true;
                tokens.push(token);
                break;
            }

            let listed = !listed_only || anchors.binary_search(&pos).is_ok();
            if is_pattern_text && listed && trimmed.starts_with('%') {
                let placeholder = placeholder_run(text, pos)
                    .and_then(|(end, body)| parse_placeholder(body, registry).map(|t| (end, t)));
                if let Some((end, mut token)) = placeholder {
                    token.space_before = space_before;
                    prev = token.ty;
                    tokens.push(token);
                    pos = end;
                    continue;
                }
            }

            let limit = anchors
                .iter()
                .copied()
                .find(|&a| a > pos)
                .unwrap_or(text.len());
            let data = &text[pos..limit];
            let (len, mut token) = self.next_token(data, limit == text.len(), &mut quote, prev);

            if !registry.mark_spaces() {
                let trimmed_len = token.value.trim_end().len();
                token.value.truncate(trimmed_len);
            }
            token.space_before = space_before;
            prev = token.ty;
            tokens.push(token);
            pos += len;
        }

        trace!(tokens = tokens.len(), is_pattern_text, "scanned text");
        Ok(Scan {
            sequence: Sequence::new(tokens),
            is_json: json::is_json_object(text),
        })
    }

    /// Scan a log message, flattening it first when it is a JSON object.
    pub fn scan_message(&self, text: &str) -> Result<Scan, ScanError> {
        if json::is_json_object(text) {
            let sequence = self.scan_json(text)?;
            return Ok(Scan { sequence, is_json: true });
        }
        self.scan(text, false, &[])
    }

    fn next_token(
        &self,
        data: &str,
        at_end: bool,
        quote: &mut QuoteState,
        prev: TokenType,
    ) -> (usize, Token) {
        if let Some(m) = self.registry.time().match_prefix(data) {
            let mut token = Token::new(&data[..m.len], TokenType::Time);
            if m.verified {
                token.tag = self.registry.regextime();
                token.special = Some(m.group.to_string());
            }
            return (m.len, token);
        }

        if let Some(m) = hex_fsm::match_prefix(data) {
            let ty = match m.kind {
                HexKind::Mac => TokenType::Mac,
                HexKind::IPv6 => TokenType::IPv6,
                HexKind::Literal => TokenType::Literal,
            };
            return (m.len, Token::new(&data[..m.len], ty));
        }

        let (len, ty) = token_fsm::match_prefix(data, at_end, quote, prev == TokenType::IPv4);
        (len, Token::new(&data[..len], ty))
    }

    /// Listed offsets that start a valid placeholder run, sorted, and whether
    /// the list is authoritative (non-empty with no stale entry).
    fn anchors(&self, text: &str, offsets: &[usize]) -> Result<(Vec<usize>, bool), ScanError> {
        let mut anchors = Vec::with_capacity(offsets.len());
        let mut stale = false;
        for &offset in offsets {
            let Some((_, body)) = placeholder_run(text, offset) else {
                trace!(offset, "ignoring placeholder offset outside a %…% run");
                stale = true;
                continue;
            };
            if parse_placeholder(body, &self.registry).is_none() {
                return Err(ScanError::Structural(format!(
                    "invalid placeholder '%{}%' at offset {}",
                    body, offset
                )));
            }
            anchors.push(offset);
        }
        anchors.sort_unstable();
        anchors.dedup();
        let listed_only = !anchors.is_empty() && !stale;
        Ok((anchors, listed_only))
    }
}
