//! Consensus — generalizes one bucket of equal-length sequences into a
//! single pattern, column by column.

use std::collections::BTreeMap;

use super::TAIL_VARIATION_THRESHOLD;
use crate::registry::{TagRegistry, TagType, TokenType};
use crate::sequence::{Modifier, Sequence, Token};

/// A generalized column group: one token standing for one or more
/// adjacent columns of the bucket.
struct Group {
    token: Token,
    columns: std::ops::Range<usize>,
}

pub(crate) fn generalize(bucket: &[Sequence], registry: &TagRegistry) -> Sequence {
    let width = bucket.first().map(|s| s.len()).unwrap_or(0);
    let mut columns: Vec<Token> = (0..width).map(|j| column_token(bucket, j, registry)).collect();
    infer_tags(&mut columns, registry);

    let mut groups = collapse_runs(columns);
    if let Some(last) = groups.last_mut() {
        mark_variable_tail(last, bucket);
    }
    groups.into_iter().map(|g| g.token).collect()
}

fn column_token(bucket: &[Sequence], j: usize, registry: &TagRegistry) -> Token {
    let first = &bucket[0][j];
    let constant_literal = bucket
        .iter()
        .all(|s| s[j].is_literal() && s[j].value == first.value);
    if constant_literal {
        let mut token = Token::literal(first.value.clone());
        token.space_before = first.space_before;
        return token;
    }

    let Some(ty) = column_type(bucket, j) else {
        // no single type takes every row
        let mut token = Token::placeholder(TagType::UNKNOWN, TokenType::String);
        token.modifier = Modifier::Minus;
        token.value = first.value.clone();
        token.space_before = first.space_before;
        return token;
    };
    let mut token = Token::placeholder(TagType::UNKNOWN, ty);
    token.value = first.value.clone();
    token.space_before = first.space_before;

    if ty == TokenType::Time {
        let regextime = registry.regextime();
        let pinned = bucket
            .iter()
            .all(|s| s[j].tag == regextime && s[j].special == first.special);
        if pinned && first.special.is_some() {
            token.tag = regextime;
            token.special = first.special.clone();
        }
    }
    token
}

/// Majority type of a column, Literal counted as String, ties going to the
/// more specific type. Widened to Float or String when the majority cannot
/// accept every row; `None` when not even String can.
fn column_type(bucket: &[Sequence], j: usize) -> Option<TokenType> {
    let mut counts: BTreeMap<TokenType, usize> = BTreeMap::new();
    for s in bucket {
        let ty = match s[j].ty {
            TokenType::Literal | TokenType::Unknown => TokenType::String,
            ty => ty,
        };
        *counts.entry(ty).or_default() += 1;
    }
    let majority = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.specificity().cmp(&a.0.specificity())))
        .map(|(ty, _)| *ty)
        .unwrap_or(TokenType::String);

    [majority, TokenType::Float, TokenType::String]
        .into_iter()
        .find(|ty| bucket.iter().all(|s| ty.accepts(s[j].ty)))
}

fn infer_tags(columns: &mut [Token], registry: &TagRegistry) {
    for j in 0..columns.len() {
        let token = &columns[j];
        if token.is_literal()
            || !token.tag.is_unknown()
            || matches!(token.ty, TokenType::Time | TokenType::MultiLine)
        {
            continue;
        }
        let Some(word) = preceding_word(&columns[..j]) else {
            continue;
        };
        let tag = registry
            .keyword(word)
            .or_else(|| registry.prekey(word).first().copied());
        if let Some(tag) = tag {
            columns[j].tag = tag;
        }
    }
}

/// Nearest literal word before a column, skipping punctuation literals and
/// stopping at any placeholder.
fn preceding_word(columns: &[Token]) -> Option<&str> {
    for token in columns.iter().rev() {
        if token.is_placeholder() {
            return None;
        }
        if token.value.chars().any(char::is_alphanumeric) {
            return Some(&token.value);
        }
    }
    None
}

fn collapse_runs(columns: Vec<Token>) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::with_capacity(columns.len());
    for (j, token) in columns.into_iter().enumerate() {
        if let Some(prev) = groups.last_mut() {
            let same_slot = collapsible(&token)
                && collapsible(&prev.token)
                && prev.token.tag == token.tag
                && prev.token.ty == token.ty
                && prev.token.special == token.special;
            if same_slot {
                prev.token.modifier = Modifier::Plus;
                prev.columns.end = j + 1;
                continue;
            }
        }
        groups.push(Group { token, columns: j..j + 1 });
    }
    groups
}

/// Timestamps and runs keep one column each. A `regextime` slot has no
/// modifier in pattern text.
fn collapsible(token: &Token) -> bool {
    token.is_placeholder()
        && token.modifier == Modifier::None
        && token.special.is_none()
        && !matches!(token.ty, TokenType::Time | TokenType::MultiLine)
}

/// A trailing placeholder whose values vary widely in length becomes a
/// run to the end of the line.
fn mark_variable_tail(group: &mut Group, bucket: &[Sequence]) {
    if !group.token.is_placeholder()
        || matches!(group.token.ty, TokenType::Time | TokenType::MultiLine)
    {
        return;
    }
    let lengths: Vec<f64> = bucket
        .iter()
        .map(|s| {
            s[group.columns.clone()]
                .iter()
                .map(|t| t.value.chars().count())
                .sum::<usize>() as f64
        })
        .collect();
    if coefficient_of_variation(&lengths) > TAIL_VARIATION_THRESHOLD {
        group.token.modifier = Modifier::Minus;
    }
}

fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean
}
