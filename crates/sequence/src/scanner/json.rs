//! JSON — flattens a JSON object message into `key = value` tokens.

use serde::de::IgnoredAny;
use serde_json::Value;

use super::Scanner;
use crate::error::ScanError;
use crate::registry::TokenType;
use crate::sequence::{Sequence, Token};

/// Trimmed text is a `{…}` that parses as JSON.
pub(crate) fn is_json_object(text: &str) -> bool {
    let text = text.trim();
    text.starts_with('{') && text.ends_with('}') && serde_json::from_str::<IgnoredAny>(text).is_ok()
}

impl Scanner {
    /// Flatten a JSON object into `key = value` triples. Keys are lower-cased
    /// and nested keys joined with `.` (array elements by index). Each scalar
    /// value is typed by scanning it; values that scan to several tokens
    /// become one `String` token. Null and empty values emit only `key =`.
    pub fn scan_json(&self, text: &str) -> Result<Sequence, ScanError> {
        let value: Value =
            serde_json::from_str(text.trim()).map_err(|e| ScanError::Json(e.to_string()))?;
        if !value.is_object() {
            return Err(ScanError::Json("message root is not an object".to_string()));
        }

        let mut tokens = Vec::new();
        self.flatten(None, &value, &mut tokens)?;
        Ok(Sequence::new(tokens))
    }

    fn flatten(&self, key: Option<&str>, value: &Value, out: &mut Vec<Token>) -> Result<(), ScanError> {
        match value {
            Value::Object(map) if !map.is_empty() => {
                for (k, v) in map {
                    let k = k.to_lowercase();
                    self.flatten(Some(&join_key(key, &k)), v, out)?;
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for (i, v) in items.iter().enumerate() {
                    self.flatten(Some(&join_key(key, &i.to_string())), v, out)?;
                }
            }
            _ => {
                let Some(key) = key else {
                    return Ok(());
                };
                out.push(Token::literal(key));
                out.push(Token::literal("="));
                if let Some(token) = self.value_token(value)? {
                    out.push(token);
                }
            }
        }
        Ok(())
    }

    fn value_token(&self, value: &Value) -> Result<Option<Token>, ScanError> {
        let text = match value {
            Value::String(s) if s.is_empty() => return Ok(None),
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => return Ok(Some(Token::literal(b.to_string()))),
            _ => return Ok(None),
        };

        let mut tokens = self.scan(&text, false, &[])?.sequence.into_tokens();
        let token = match tokens.len() {
            0 => None,
            1 => tokens.pop(),
            _ => Some(Token::new(text, TokenType::String)),
        };
        Ok(token.map(|mut t| {
            t.space_before = true;
            t
        }))
    }
}

fn join_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}.{}", prefix, key),
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TagRegistry;
    use std::sync::Arc;

    fn scanner() -> Scanner {
        Scanner::new(Arc::new(TagRegistry::builtin()))
    }

    fn values(seq: &Sequence) -> Vec<&str> {
        seq.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn test_json_hint() {
        assert!(is_json_object(r#"  {"a": 1}  "#));
        assert!(!is_json_object("{not json}"));
        assert!(!is_json_object("[1, 2]"));
        assert!(!is_json_object("plain"));
    }

    #[test]
    fn test_flatten_nested_keys_and_arrays() {
        let seq = scanner()
            .scan_json(r#"{"Client":{"IP":"10.1.1.1"},"tags":["a",{"k":"v"}]}"#)
            .unwrap();
        assert_eq!(
            values(&seq),
            vec!["client.ip", "=", "10.1.1.1", "tags.0", "=", "a", "tags.1.k", "=", "v"]
        );
        assert_eq!(seq[2].ty, TokenType::IPv4);
    }

    #[test]
    fn test_multi_token_value_becomes_string() {
        let seq = scanner().scan_json(r#"{"msg":"user logged in"}"#).unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq[2].ty, TokenType::String);
        assert_eq!(seq[2].value, "user logged in");
    }

    #[test]
    fn test_scalar_types() {
        let seq = scanner().scan_json(r#"{"a":1.5,"b":true,"c":null,"d":""}"#).unwrap();
        assert_eq!(values(&seq), vec!["a", "=", "1.5", "b", "=", "true", "c", "=", "d", "="]);
        assert_eq!(seq[2].ty, TokenType::Float);
        assert_eq!(seq[5].ty, TokenType::Literal);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = scanner().scan_json("{broken").unwrap_err();
        assert!(matches!(err, ScanError::Json(_)));
        let err = scanner().scan_json("[1]").unwrap_err();
        assert!(matches!(err, ScanError::Json(_)));
    }
}
