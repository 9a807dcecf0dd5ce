//! Types — TokenType and TagType.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Shape class of a token. The scanner assigns these from character shape
/// alone and never emits `String`; pattern text and the analyzer do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    #[default]
    Unknown,
    Literal,
    Integer,
    Float,
    IPv4,
    IPv6,
    Mac,
    URI,
    String,
    Time,
    MultiLine,
}

impl TokenType {
    pub const ALL: [TokenType; 11] = [
        TokenType::Unknown,
        TokenType::Literal,
        TokenType::Integer,
        TokenType::Float,
        TokenType::IPv4,
        TokenType::IPv6,
        TokenType::Mac,
        TokenType::URI,
        TokenType::String,
        TokenType::Time,
        TokenType::MultiLine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Unknown => "unknown",
            TokenType::Literal => "literal",
            TokenType::Integer => "integer",
            TokenType::Float => "float",
            TokenType::IPv4 => "ipv4",
            TokenType::IPv6 => "ipv6",
            TokenType::Mac => "mac",
            TokenType::URI => "uri",
            TokenType::String => "string",
            TokenType::Time => "time",
            TokenType::MultiLine => "multiline",
        }
    }

    pub fn from_name(name: &str) -> Option<TokenType> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Types a placeholder may carry. `unknown` and `literal` never do.
    pub fn is_placeholder_type(&self) -> bool {
        !matches!(self, TokenType::Unknown | TokenType::Literal)
    }

    /// Whether an input token of type `input` can fill a slot of this type.
    pub fn accepts(&self, input: TokenType) -> bool {
        if *self == input {
            return true;
        }
        match self {
            TokenType::String => matches!(
                input,
                TokenType::Literal
                    | TokenType::Integer
                    | TokenType::Float
                    | TokenType::URI
                    | TokenType::Mac
                    | TokenType::IPv6
                    | TokenType::IPv4
            ),
            TokenType::Float => input == TokenType::Integer,
            _ => false,
        }
    }

    /// Tie-break rank for column consensus; lower is more specific.
    pub(crate) fn specificity(&self) -> u8 {
        match self {
            TokenType::Integer => 0,
            TokenType::Float => 1,
            TokenType::IPv4 => 2,
            TokenType::String | TokenType::Literal => 3,
            TokenType::IPv6 => 4,
            TokenType::Mac => 5,
            TokenType::URI => 6,
            TokenType::Time => 7,
            TokenType::MultiLine => 8,
            TokenType::Unknown => 9,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic tag id. Ids come from configuration order, so identical
/// configuration yields identical ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TagType(pub u32);

impl TagType {
    pub const UNKNOWN: TagType = TagType(0);

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_type_names_round_trip() {
        for ty in TokenType::ALL {
            assert_eq!(TokenType::from_name(ty.as_str()), Some(ty));
        }
        assert_eq!(TokenType::from_name("bogus"), None);
    }

    #[test]
    fn test_string_accepts_scalar_shapes() {
        assert!(TokenType::String.accepts(TokenType::Literal));
        assert!(TokenType::String.accepts(TokenType::IPv4));
        assert!(TokenType::String.accepts(TokenType::Integer));
        assert!(!TokenType::String.accepts(TokenType::Time));
        assert!(!TokenType::String.accepts(TokenType::MultiLine));
    }

    #[test]
    fn test_float_accepts_integer_not_reverse() {
        assert!(TokenType::Float.accepts(TokenType::Integer));
        assert!(!TokenType::Integer.accepts(TokenType::Float));
    }

    #[test]
    fn test_multiline_accepts_only_itself() {
        assert!(TokenType::MultiLine.accepts(TokenType::MultiLine));
        assert!(!TokenType::MultiLine.accepts(TokenType::Literal));
    }

    #[test]
    fn test_placeholder_types() {
        assert!(!TokenType::Literal.is_placeholder_type());
        assert!(!TokenType::Unknown.is_placeholder_type());
        assert!(TokenType::Integer.is_placeholder_type());
    }

    #[test]
    fn test_specificity_order() {
        assert!(TokenType::Integer.specificity() < TokenType::Float.specificity());
        assert!(TokenType::Float.specificity() < TokenType::IPv4.specificity());
        assert!(TokenType::IPv4.specificity() < TokenType::String.specificity());
    }
}
