//! Hex FSM — colon-separated hex runs: MAC addresses, IPv6 addresses and
//! other colon-delimited hex literals.

use super::token_fsm::is_literal;
use super::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HexKind {
    Mac,
    IPv6,
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HexMatch {
    pub len: usize,
    pub kind: HexKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Start,
    /// Inside a hex run holding this many digits.
    Digits(u8),
    Colon,
}

#[derive(Debug, Default)]
struct HexFsm {
    state: State,
    colons: usize,
    successive: usize,
    max_successive: usize,
    series: usize,
}

impl HexFsm {
    fn step(&mut self, idx: usize, r: Option<char>) -> Step {
        match (self.state, r) {
            (State::Start, Some(c)) if c.is_ascii_hexdigit() => {
                self.state = State::Digits(1);
                Step::Continue
            }
            (State::Start, Some(':')) => {
                self.colon();
                Step::Continue
            }
            (State::Start, _) => Step::Reject,

            (State::Digits(n), Some(c)) if c.is_ascii_hexdigit() => {
                if n >= 4 {
                    return Step::Reject;
                }
                self.state = State::Digits(n + 1);
                Step::Continue
            }
            (State::Colon, Some(c)) if c.is_ascii_hexdigit() => {
                self.successive = 0;
                self.state = State::Digits(1);
                Step::Continue
            }
            (_, Some(':')) => {
                self.colon();
                if self.successive > 2 {
                    Step::Reject
                } else {
                    Step::Continue
                }
            }
            (_, Some(c)) if is_literal(c) => Step::Reject,
            _ if self.colons > 0 => Step::Accept(idx),
            _ => Step::Reject,
        }
    }

    fn colon(&mut self) {
        self.colons += 1;
        self.successive = if self.state == State::Colon { self.successive + 1 } else { 1 };
        if self.successive == 2 {
            self.series += 1;
        }
        self.max_successive = self.max_successive.max(self.successive);
        self.state = State::Colon;
    }

    fn kind(&self) -> Option<HexKind> {
        if self.colons <= 1 {
            return None;
        }
        let kind = if self.colons == 5 && self.max_successive == 1 {
            HexKind::Mac
        } else if (self.series == 1 && self.colons <= 7) || (self.colons == 7 && self.series == 0) {
            HexKind::IPv6
        } else {
            HexKind::Literal
        };
        Some(kind)
    }
}

/// Colon-delimited hex token at the start of `data`, if any. Nothing is
/// recognised unless the run holds more than one colon.
pub(crate) fn match_prefix(data: &str) -> Option<HexMatch> {
    let mut fsm = HexFsm::default();
    let mut chars = data.char_indices();
    loop {
        let (idx, r) = match chars.next() {
            Some((idx, r)) => (idx, Some(r)),
            None => (data.len(), None),
        };
        match fsm.step(idx, r) {
            Step::Continue => {}
            Step::Reject => return None,
            Step::Accept(len) => return fsm.kind().map(|kind| HexMatch { len, kind }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(text: &str) -> Option<HexKind> {
        match_prefix(text).map(|m| m.kind)
    }

    #[test]
    fn test_mac_address() {
        let m = match_prefix("00:04:c1:8b:d8:82 dmac").unwrap();
        assert_eq!(m, HexMatch { len: 17, kind: HexKind::Mac });
    }

    #[test]
    fn test_ipv6_full_and_compressed() {
        assert_eq!(kind("dead:beef:1234:5678:223:32ff:feb1:2e50"), Some(HexKind::IPv6));
        assert_eq!(kind("f0f0:f::1"), Some(HexKind::IPv6));
        assert_eq!(kind("2001:db8::ff00:42:8329,"), Some(HexKind::IPv6));
        assert_eq!(match_prefix(":: rest").map(|m| m.len), Some(2));
    }

    #[test]
    fn test_long_colon_run_is_literal() {
        let text = "de:ad:be:ef:74:a6:bb:45:45:52:71:de:b2:12:34:56";
        let m = match_prefix(text).unwrap();
        assert_eq!(m.kind, HexKind::Literal);
        assert_eq!(m.len, text.len());
    }

    #[test]
    fn test_single_colon_is_not_hex() {
        assert_eq!(kind("12:30"), None);
        assert_eq!(kind("dead:beef"), None);
    }

    #[test]
    fn test_trailing_colon_kept_in_literal() {
        let m = match_prefix("ab:cd: x").unwrap();
        assert_eq!(m, HexMatch { len: 6, kind: HexKind::Literal });
    }

    #[test]
    fn test_word_continuation_rejects() {
        assert_eq!(kind("00:04:c1:8b:d8:82x"), None);
        assert_eq!(kind("12:34:56789"), None);
        assert_eq!(kind("499F62D65:"), None);
        assert_eq!(kind("hello"), None);
    }

    #[test]
    fn test_triple_colon_rejects() {
        assert_eq!(kind("a:::b"), None);
    }

    #[test]
    fn test_two_series_is_literal() {
        assert_eq!(kind("a::b::c"), Some(HexKind::Literal));
    }
}
