//! Grammar — the `%name[:override][:modifier]%` placeholder syntax.
//!
//! `name` is a tag name or a type name. A tag may override its default type.
//! `%name:-:word%` is a `Minus` run that stops at the literal `word`, and
//! `%regextime:N%` pins a timestamp to regex group `N`. An empty first
//! suffix with nothing after it (`%tag:%`) is ambiguous and rejected.

use super::token::{Modifier, Token};
use crate::registry::{TagRegistry, TagType, TokenType};

/// Locate a `%…%` run starting at byte `start` of `text`. Returns the byte
/// offset just past the closing `%` and the body between the marks.
pub(crate) fn placeholder_run(text: &str, start: usize) -> Option<(usize, &str)> {
    let rest = text.get(start..)?;
    let body_start = rest.strip_prefix('%')?;
    for (idx, r) in body_start.char_indices() {
        match r {
            '%' if idx > 0 => return Some((start + idx + 2, &body_start[..idx])),
            '%' => return None,
            r if r.is_whitespace() => return None,
            _ => {}
        }
    }
    None
}

/// Parse a placeholder body. `None` when the body names nothing the
/// registry knows or its suffixes are malformed.
pub(crate) fn parse_placeholder(body: &str, registry: &TagRegistry) -> Option<Token> {
    let mut parts = body.splitn(3, ':');
    let name = parts.next()?;
    let suffixes: Vec<&str> = parts.collect();

    let (tag, default_ty) = match registry.tag(name) {
        Some(tag) => (tag, registry.default_type(tag)),
        None => {
            let ty = TokenType::from_name(name).filter(TokenType::is_placeholder_type)?;
            (TagType::UNKNOWN, ty)
        }
    };
    let mut token = Token::placeholder(tag, default_ty);
    token.value = format!("%{}%", body);

    match suffixes.as_slice() {
        [] => {}
        [id] if tag == registry.regextime() && is_group_id(id) => {
            token.special = Some(id.to_string());
        }
        [suffix] => {
            if let Some(modifier) = Modifier::from_suffix(suffix) {
                token.modifier = modifier;
            } else if suffix.is_empty() {
                return None;
            } else {
                token.ty = type_override(suffix, tag)?;
            }
        }
        ["-", until] => {
            if until.is_empty() {
                return None;
            }
            token.modifier = Modifier::Minus;
            token.until = Some(until.to_string());
        }
        [ty, modifier] => {
            if !ty.is_empty() {
                token.ty = type_override(ty, tag)?;
            }
            token.modifier = Modifier::from_suffix(modifier)?;
        }
        _ => return None,
    }
    Some(token)
}

fn type_override(name: &str, tag: TagType) -> Option<TokenType> {
    if tag.is_unknown() {
        return None;
    }
    TokenType::from_name(name).filter(TokenType::is_placeholder_type)
}

fn is_group_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Render a placeholder token in pattern syntax.
pub(crate) fn format_placeholder(token: &Token, registry: &TagRegistry) -> String {
    let mut out = String::from("%");

    if token.tag.is_unknown() {
        out.push_str(token.ty.as_str());
        push_run_suffix(&mut out, token, false);
    } else {
        out.push_str(registry.name(token.tag).unwrap_or("funknown"));
        if token.tag == registry.regextime() && token.special.is_some() {
            if let Some(id) = &token.special {
                out.push(':');
                out.push_str(id);
            }
        } else {
            let overridden = token.ty != registry.default_type(token.tag);
            if overridden && token.until.is_none() {
                out.push(':');
                out.push_str(token.ty.as_str());
            }
            push_run_suffix(&mut out, token, !overridden);
        }
    }

    out.push('%');
    out
}

fn push_run_suffix(out: &mut String, token: &Token, empty_override: bool) {
    if let Some(until) = &token.until {
        out.push_str(":-:");
        out.push_str(until);
    } else if let Some(suffix) = token.modifier.as_suffix() {
        if empty_override {
            out.push(':');
        }
        out.push(':');
        out.push_str(suffix);
    }
}
