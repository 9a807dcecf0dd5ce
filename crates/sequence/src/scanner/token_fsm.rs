//! Token FSM — words, numbers, IPv4 addresses and URIs by character class,
//! plus the per-message quote state.

use crate::registry::TokenType;

/// Characters that continue a word.
pub(crate) fn is_literal(r: char) -> bool {
    matches!(r, '+' | '-' | '_' | '\\' | '%' | '*' | '@' | '$' | '.' | '/' | '~') || r.is_alphanumeric()
}

// RFC 3986 section 2
fn is_url_char(r: char) -> bool {
    matches!(
        r,
        '-' | '.' | '_' | '~' | ':' | '/' | '?' | '#' | '[' | ']' | '@' | '!' | '$' | '&' | '\''
            | '(' | ')' | '*' | '+' | ',' | ';' | '=' | '%' | '|'
    ) || r.is_ascii_alphanumeric()
}

/// Open quote of the message being scanned. Quoted runs stay one token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct QuoteState {
    open: Option<char>,
}

impl QuoteState {
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn closes(&self, r: char) -> bool {
        matches!((self.open, r), (Some('"'), '"') | (Some('\''), '\'') | (Some('<'), '>'))
    }

    /// Inside a quote and `r` is not its closing mark.
    fn quoted(&self, r: char) -> bool {
        self.is_open() && !self.closes(r)
    }
}

#[derive(Debug)]
struct TokenFsm<'q> {
    ty: TokenType,
    dots: usize,
    backslash: bool,
    quote: &'q QuoteState,
}

impl TokenFsm<'_> {
    /// Advance over the `i`-th character of the token; `false` stops the
    /// token before `r`.
    fn step(&mut self, i: usize, r: char) -> bool {
        let keep = match self.ty {
            TokenType::URI => self.uri_step(i, r),
            TokenType::Integer => match r {
                '0'..='9' => true,
                '.' => {
                    self.dots += 1;
                    self.ty = TokenType::Float;
                    true
                }
                _ => self.continue_as_literal(r),
            },
            TokenType::Float => match r {
                '0'..='9' => true,
                '.' => {
                    self.dots += 1;
                    self.ty = TokenType::IPv4;
                    true
                }
                _ => self.continue_as_literal(r),
            },
            TokenType::IPv4 => match r {
                '0'..='9' => true,
                '.' => {
                    self.dots += 1;
                    true
                }
                '/' => false,
                _ => self.continue_as_literal(r),
            },
            _ => {
                is_literal(r)
                    || self.backslash
                    || self.quote.quoted(r)
                    || (!self.quote.is_open() && r == '\'')
            }
        };
        self.backslash = r == '\\';
        keep
    }

    fn uri_step(&mut self, i: usize, r: char) -> bool {
        match (i, r) {
            (1 | 2, 't' | 'T') | (3, 'p' | 'P') | (4, 's' | 'S') | (4 | 5, ':') | (5..=7, '/') => true,
            _ if i >= 6 && is_url_char(r) => true,
            (4, '/') => {
                // http/1.1
                self.ty = TokenType::Literal;
                true
            }
            _ if is_literal(r) || self.quote.quoted(r) => {
                self.ty = TokenType::Literal;
                true
            }
            _ => {
                if i < 6 {
                    self.ty = TokenType::Literal;
                }
                false
            }
        }
    }

    fn continue_as_literal(&mut self, r: char) -> bool {
        if is_literal(r) || self.quote.quoted(r) {
            self.ty = TokenType::Literal;
            true
        } else {
            false
        }
    }
}

/// Scan one token from the start of `data`, which must not be empty or
/// start with whitespace. `at_end` says `data` runs to the end of the
/// message; `after_ipv4` says the previous token was an IPv4 address.
/// Returns the byte length and type of the token.
pub(crate) fn match_prefix(
    data: &str,
    at_end: bool,
    quote: &mut QuoteState,
    after_ipv4: bool,
) -> (usize, TokenType) {
    let mut chars = data.chars();
    let Some(first) = chars.next() else {
        return (0, TokenType::Literal);
    };
    let single = (first.len_utf8(), TokenType::Literal);
    let second = chars.next();

    let ty = match first {
        '"' | '\'' => {
            if !quote.is_open() {
                quote.open = Some(first);
            } else if quote.open == Some(first) {
                quote.open = None;
            }
            return single;
        }
        '<' if !quote.is_open() => {
            quote.open = Some('<');
            return single;
        }
        '>' => {
            if quote.open == Some('<') {
                quote.open = None;
            }
            return single;
        }
        '?' | '&' => return single,
        '/' if after_ipv4 => return single,
        '0'..='9' => TokenType::Integer,
        'h' | 'H' if matches!(second, Some('t' | 'T')) => TokenType::URI,
        '\\' | '<' => TokenType::Literal,
        r if is_literal(r) || quote.quoted(r) => TokenType::Literal,
        _ => return single,
    };

    let mut fsm = TokenFsm {
        ty,
        dots: 0,
        backslash: first == '\\',
        quote: &*quote,
    };
    let mut len = data.len();
    let mut stopped = false;
    for (i, (idx, r)) in data.char_indices().enumerate().skip(1) {
        if !fsm.step(i, r) {
            len = idx;
            stopped = true;
            break;
        }
    }

    let trailing_dot = !stopped && at_end && data[..len].ends_with('.');
    match fsm.ty {
        TokenType::Float if trailing_dot => (len - 1, TokenType::Integer),
        TokenType::IPv4 if fsm.dots != 3 => (len, TokenType::Literal),
        TokenType::Literal if trailing_dot && len > 1 => (len - 1, TokenType::Literal),
        ty => (len, ty),
    }
}
