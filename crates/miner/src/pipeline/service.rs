//! Service — one batch pass over the records of a single service.
//!
//! Known patterns are tried first; the misses are generalized by an
//! Analyzer and mapped to the patterns it discovers. A discovered pattern
//! with no literal anchor could never be loaded back into a `Parser`, so
//! its lines stay unmatched.

use std::collections::HashMap;
use std::sync::Arc;

use sequence::parser::{pattern_id, service_id};
use sequence::{complexity_score, Analyzer, Parser, PatternId, Scanner, Sequence, TagRegistry, Token};
use tracing::{debug, trace};

use crate::store::{BatchResult, LineOutcome, MatchedPattern, StoredPattern};

/// Run scan, parse and discovery for one service. Pure CPU work.
pub fn process_service(
    registry: Arc<TagRegistry>,
    service: String,
    stored: Vec<StoredPattern>,
    messages: Vec<String>,
) -> BatchResult {
    let scanner = Scanner::new(Arc::clone(&registry));
    let parser = load_parser(&registry, &service, &stored);
    let complexity: HashMap<PatternId, f64> = parser
        .patterns()
        .iter()
        .map(|p| (p.id.clone(), complexity_score(&p.sequence)))
        .collect();

    let mut lines: Vec<LineOutcome> = Vec::with_capacity(messages.len());
    let mut analyzer = Analyzer::new(Arc::clone(&registry));
    let mut misses: Vec<(usize, Sequence)> = Vec::new();

    for message in messages {
        let sequence = match scanner.scan_message(&message) {
            Ok(scan) => scan.sequence,
            Err(e) => {
                debug!(service = %service, "scan failed: {}", e);
                lines.push(LineOutcome { message, matched: None });
                continue;
            }
        };

        let matched = match parser.parse(&sequence) {
            Ok(m) => Some(MatchedPattern {
                id: pattern_id(&m.pattern, &service),
                complexity: complexity.get(&m.pattern_id).copied().unwrap_or_default(),
                pattern: m.pattern,
                tag_offsets: m.tag_offsets,
                discovered: false,
            }),
            Err(_) => {
                if analyzer.add(sequence.clone()).is_ok() {
                    misses.push((lines.len(), sequence));
                }
                None
            }
        };
        lines.push(LineOutcome { message, matched });
    }

    if !misses.is_empty() {
        discover(&registry, &service, analyzer, misses, &mut lines);
    }

    BatchResult {
        service_id: service_id(&service),
        service,
        lines,
    }
}

fn load_parser(registry: &Arc<TagRegistry>, service: &str, stored: &[StoredPattern]) -> Parser {
    let mut parser = Parser::new(Arc::clone(registry));
    for p in stored {
        // Patterns without a literal anchor cannot be registered.
        if let Err(e) = parser.add_text(&p.pattern, &p.tag_offsets) {
            debug!(service, pattern = %p.pattern, "stored pattern not loaded: {}", e);
        }
    }
    parser
}

fn discover(
    registry: &TagRegistry,
    service: &str,
    mut analyzer: Analyzer,
    misses: Vec<(usize, Sequence)>,
    lines: &mut [LineOutcome],
) {
    if let Err(e) = analyzer.finalize() {
        debug!(service, "nothing to finalize: {}", e);
        return;
    }

    for (idx, sequence) in misses {
        let Ok(pattern) = analyzer.analyze(&sequence) else {
            trace!(service, "no discovered pattern for line {}", idx);
            continue;
        };
        if !pattern.iter().any(Token::is_literal) {
            trace!(service, "discovered pattern for line {} has no literal anchor", idx);
            continue;
        }
        let (text, tag_offsets) = pattern.to_pattern_string(registry);
        lines[idx].matched = Some(MatchedPattern {
            id: pattern_id(&text, service),
            pattern: text,
            tag_offsets,
            complexity: complexity_score(&pattern),
            discovered: true,
        });
    }
}
