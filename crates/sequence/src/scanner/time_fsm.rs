//! Time FSM — recognises timestamps by walking a trie of layout shapes.
//!
//! Layout characters are classes: a digit matches any digit, an ASCII letter
//! matches any ASCII letter, `_` matches a space or a digit, `±` matches a
//! sign, and anything else matches itself. Several layout characters can
//! accept the same input, so the walk keeps a set of live nodes.

use std::collections::HashMap;

use regex::Regex;

use super::Step;

/// One configured timestamp group.
#[derive(Debug)]
pub(crate) struct TimeGroup {
    pub id: u32,
    pub layouts: Vec<String>,
    pub regex: Option<Regex>,
}

/// A recognised timestamp at the start of the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimeMatch {
    pub len: usize,
    pub group: u32,
    /// The group has a verification regex, so the token is a `regextime`.
    pub verified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Digit,
    Letter,
    SpaceOrDigit,
    Sign,
    Exact(char),
}

impl Class {
    fn of(c: char) -> Class {
        match c {
            '_' => Class::SpaceOrDigit,
            '±' => Class::Sign,
            c if c.is_ascii_digit() => Class::Digit,
            c if c.is_ascii_alphabetic() => Class::Letter,
            c => Class::Exact(c),
        }
    }

    fn accepts(&self, r: char) -> bool {
        match self {
            Class::Digit => r.is_ascii_digit(),
            Class::Letter => r.is_ascii_alphabetic(),
            Class::SpaceOrDigit => r == ' ' || r.is_ascii_digit(),
            Class::Sign => r == '+' || r == '-',
            Class::Exact(c) => *c == r,
        }
    }
}

#[derive(Debug, Default)]
struct Node {
    children: Vec<(Class, usize)>,
    /// Groups with a layout ending here.
    finals: Vec<u32>,
}

#[derive(Debug)]
pub(crate) struct TimeMatcher {
    nodes: Vec<Node>,
    regexes: HashMap<u32, Regex>,
    min_len: usize,
}

impl Default for TimeMatcher {
    fn default() -> Self {
        Self {
            nodes: vec![Node::default()],
            regexes: HashMap::new(),
            min_len: 0,
        }
    }
}

impl TimeMatcher {
    pub fn build(groups: Vec<TimeGroup>) -> Self {
        let mut matcher = TimeMatcher::default();
        let mut min_len = usize::MAX;

        for group in groups {
            for layout in &group.layouts {
                if layout.is_empty() {
                    continue;
                }
                matcher.insert(layout, group.id);
                min_len = min_len.min(layout.chars().count());
            }
            if let Some(regex) = group.regex {
                matcher.regexes.insert(group.id, regex);
            }
        }
        matcher.min_len = if min_len == usize::MAX { 0 } else { min_len };
        matcher
    }

    fn insert(&mut self, layout: &str, group: u32) {
        let mut node = 0;
        for c in layout.chars() {
            let class = Class::of(c);
            let existing = self.nodes[node]
                .children
                .iter()
                .find(|(k, _)| *k == class)
                .map(|(_, child)| *child);
            node = match existing {
                Some(child) => child,
                None => {
                    self.nodes.push(Node::default());
                    let child = self.nodes.len() - 1;
                    self.nodes[node].children.push((class, child));
                    child
                }
            };
        }
        if !self.nodes[node].finals.contains(&group) {
            self.nodes[node].finals.push(group);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// Longest timestamp at the start of `data`. Candidates from groups with a
    /// regex must also pass the anchored regex; a rejected candidate falls
    /// back to the next shorter one.
    pub fn match_prefix(&self, data: &str) -> Option<TimeMatch> {
        if self.is_empty() || data.chars().take(self.min_len).count() < self.min_len {
            return None;
        }

        let mut walk = TimeWalk::new(self);
        let mut candidates: Vec<(usize, u32)> = Vec::new();

        for (idx, r) in data.char_indices() {
            match walk.step(idx, r) {
                Step::Continue => {}
                Step::Reject => break,
                Step::Accept(end) => candidates.extend(walk.finals().map(|group| (end, group))),
            }
        }

        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        candidates.into_iter().find_map(|(len, group)| match self.regexes.get(&group) {
            Some(re) if re.is_match(&data[..len]) => Some(TimeMatch { len, group, verified: true }),
            Some(_) => None,
            None => Some(TimeMatch { len, group, verified: false }),
        })
    }
}

/// Live nodes of one walk. Several layout characters can accept the same
/// input, so more than one node may be live.
struct TimeWalk<'m> {
    matcher: &'m TimeMatcher,
    active: Vec<usize>,
    next: Vec<usize>,
}

impl<'m> TimeWalk<'m> {
    fn new(matcher: &'m TimeMatcher) -> Self {
        Self {
            matcher,
            active: vec![0],
            next: Vec::new(),
        }
    }

    /// Advance over `r` at byte `idx`. `Accept` carries the end of a layout
    /// that finishes here; the walk may still continue past it.
    fn step(&mut self, idx: usize, r: char) -> Step {
        self.next.clear();
        for &node in &self.active {
            for (class, child) in &self.matcher.nodes[node].children {
                if class.accepts(r) && !self.next.contains(child) {
                    self.next.push(*child);
                }
            }
        }
        if self.next.is_empty() {
            return Step::Reject;
        }
        std::mem::swap(&mut self.active, &mut self.next);

        if self.finals().next().is_some() {
            Step::Accept(idx + r.len_utf8())
        } else {
            Step::Continue
        }
    }

    /// Groups with a layout ending at the current position.
    fn finals(&self) -> impl Iterator<Item = u32> + '_ {
        self.active
            .iter()
            .flat_map(|&node| self.matcher.nodes[node].finals.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> TimeMatcher {
        TimeMatcher::build(vec![
            TimeGroup {
                id: 1,
                layouts: vec!["Jan _2 15:04:05".into(), "Jan 02 15:04:05".into()],
                regex: Some(Regex::new(r"^(?:[A-Za-z]{3}\s+\d{1,2} \d{2}:\d{2}:\d{2})$").unwrap()),
            },
            TimeGroup {
                id: 2,
                layouts: vec!["2006-01-02".into(), "2006-01-02T15:04:05±07:00".into()],
                regex: None,
            },
        ])
    }

    #[test]
    fn test_syslog_timestamp_with_padded_day() {
        let m = matcher().match_prefix("Feb  8 12:15:52 mail postfix").unwrap();
        assert_eq!(m, TimeMatch { len: 15, group: 1, verified: true });
    }

    #[test]
    fn test_syslog_timestamp_two_digit_day() {
        let m = matcher().match_prefix("Jan 31 21:42:59 host").unwrap();
        assert_eq!(m.len, 15);
        assert_eq!(m.group, 1);
    }

    #[test]
    fn test_longest_layout_wins() {
        let text = "2014-08-16T04:52:42+00:00 rest";
        let m = matcher().match_prefix(text).unwrap();
        assert_eq!(&text[..m.len], "2014-08-16T04:52:42+00:00");
        assert!(!m.verified);
    }

    #[test]
    fn test_shorter_layout_when_longer_breaks() {
        let m = matcher().match_prefix("2014-08-16 something").unwrap();
        assert_eq!(m.len, 10);
    }

    #[test]
    fn test_regex_rejection_drops_candidate() {
        let m = TimeMatcher::build(vec![TimeGroup {
            id: 9,
            layouts: vec!["Jan _2".into()],
            regex: Some(Regex::new("^(?:Jan.*)$").unwrap()),
        }]);
        assert!(m.match_prefix("Feb 12").is_none());
        assert_eq!(m.match_prefix("Jan 12").map(|t| t.len), Some(6));
    }

    #[test]
    fn test_non_timestamps_rejected() {
        let m = matcher();
        assert!(m.match_prefix("id=firewall").is_none());
        assert!(m.match_prefix("61.167.71.244").is_none());
        assert!(m.match_prefix("rule=accept").is_none());
        assert!(m.match_prefix("").is_none());
    }

    #[test]
    fn test_walk_steps() {
        let m = matcher();
        let mut walk = TimeWalk::new(&m);
        let mut steps = Vec::new();
        for (i, r) in "2014-08-16 x".char_indices() {
            let step = walk.step(i, r);
            steps.push(step);
            if step == Step::Reject {
                break;
            }
            if i == 9 {
                assert_eq!(walk.finals().collect::<Vec<_>>(), vec![2]);
            }
        }
        assert!(steps[..9].iter().all(|s| *s == Step::Continue));
        assert_eq!(steps[9], Step::Accept(10));
        assert_eq!(steps[10], Step::Reject);
    }

    #[test]
    fn test_empty_matcher_matches_nothing() {
        assert!(TimeMatcher::default().match_prefix("Jan 31 21:42:59").is_none());
    }
}
