//! Token — one positional element of a sequence.

use crate::registry::{TagType, TokenType};

/// Variable-run behaviour of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Modifier {
    #[default]
    None,
    /// One or more tokens of the placeholder's type.
    Plus,
    /// A run of any tokens up to the `until` literal, or to the end.
    Minus,
    /// Zero or more tokens of the placeholder's type.
    Star,
}

impl Modifier {
    pub fn as_suffix(&self) -> Option<&'static str> {
        match self {
            Modifier::None => None,
            Modifier::Plus => Some("+"),
            Modifier::Minus => Some("-"),
            Modifier::Star => Some("*"),
        }
    }

    pub fn from_suffix(s: &str) -> Option<Modifier> {
        match s {
            "+" => Some(Modifier::Plus),
            "-" => Some(Modifier::Minus),
            "*" => Some(Modifier::Star),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        *self != Modifier::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub value: String,
    pub ty: TokenType,
    pub tag: TagType,
    /// Whitespace preceded this token in the source text.
    pub space_before: bool,
    pub modifier: Modifier,
    /// Literal that terminates a `Minus` run.
    pub until: Option<String>,
    /// Timestamp regex group of a `regextime` token.
    pub special: Option<String>,
}

impl Token {
    pub fn new(value: impl Into<String>, ty: TokenType) -> Self {
        Self {
            value: value.into(),
            ty,
            tag: TagType::UNKNOWN,
            space_before: false,
            modifier: Modifier::None,
            until: None,
            special: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(value, TokenType::Literal)
    }

    pub fn placeholder(tag: TagType, ty: TokenType) -> Self {
        Self {
            tag,
            ..Self::new("", ty)
        }
    }

    /// Tagged, or carrying a type other than `Unknown`/`Literal`.
    pub fn is_placeholder(&self) -> bool {
        !self.tag.is_unknown() || self.ty.is_placeholder_type()
    }

    pub fn is_literal(&self) -> bool {
        !self.is_placeholder()
    }

    /// A literal run of whitespace, as emitted in mark-spaces mode.
    pub fn is_space(&self) -> bool {
        self.is_literal() && !self.value.is_empty() && self.value.chars().all(char::is_whitespace)
    }
}
