//! Sequence — the token-sequence value type and its pattern-string form.

pub mod token;
pub(crate) mod grammar;

use std::ops::Deref;

pub use token::{Modifier, Token};

use crate::registry::{TagRegistry, TokenType};

const MULTILINE_DISPLAY_LEN: usize = 15;

/// Ordered, index-significant tokens of one message or pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Sequence {
    tokens: Vec<Token>,
}

impl Sequence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Serialize into pattern syntax. Returns the text and the byte offset of
    /// every placeholder in it.
    ///
    /// In mark-spaces mode whitespace tokens print verbatim and carry the
    /// spacing; a separator is only added for a spaced token that has no
    /// whitespace token before it.
    pub fn to_pattern_string(&self, registry: &TagRegistry) -> (String, Vec<usize>) {
        let mark_spaces = registry.mark_spaces();
        let mut out = String::new();
        let mut offsets = Vec::new();

        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 && (!mark_spaces || (token.space_before && !self.tokens[i - 1].is_space())) {
                out.push(' ');
            }
            if token.is_placeholder() {
                offsets.push(out.len());
                out.push_str(&grammar::format_placeholder(token, registry));
            } else {
                out.push_str(&token.value);
            }
        }
        (out, offsets)
    }

    /// Coarse shape of the sequence: typed tokens as `%type%` plus
    /// single-character literals. Lines of one template share a signature.
    pub fn signature(&self) -> String {
        let mut sig = String::new();
        for token in &self.tokens {
            match token.ty {
                TokenType::Unknown | TokenType::Literal | TokenType::String => {
                    let mut chars = token.value.chars();
                    if let (Some(c), None) = (chars.next(), chars.next()) {
                        sig.push(c);
                    }
                }
                ty => {
                    sig.push('%');
                    sig.push_str(ty.as_str());
                    sig.push('%');
                }
            }
        }
        sig
    }

    /// Debug dump, one `# idx: token` line per token.
    pub fn print_tokens(&self, registry: &TagRegistry) -> String {
        let mut out = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            let value = if token.ty == TokenType::MultiLine {
                display_truncated(&token.value)
            } else {
                token.value.clone()
            };
            out.push_str(&format!(
                "# {:3}: {{ Tag=\"{}\", Type=\"{}\", Value=\"{}\"",
                i,
                registry.name(token.tag).unwrap_or("funknown"),
                token.ty,
                value
            ));
            if let Some(suffix) = token.modifier.as_suffix() {
                out.push_str(&format!(", Modifier=\"{}\"", suffix));
            }
            if let Some(special) = &token.special {
                out.push_str(&format!(", Special=\"{}\"", special));
            }
            out.push_str(" }\n");
        }
        out
    }
}

fn display_truncated(value: &str) -> String {
    match value.char_indices().nth(MULTILINE_DISPLAY_LEN) {
        Some((idx, _)) => format!("{}...", &value[..idx]),
        None => value.to_string(),
    }
}

impl Deref for Sequence {
    type Target = [Token];

    fn deref(&self) -> &[Token] {
        &self.tokens
    }
}

impl From<Vec<Token>> for Sequence {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl FromIterator<Token> for Sequence {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Sequence {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
