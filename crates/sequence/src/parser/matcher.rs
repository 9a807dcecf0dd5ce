//! Matcher — backtracking walk of a pattern trie against one input sequence.
//!
//! Every full match is considered; the one covering the fewest input tokens
//! with placeholders wins, ties going to the earliest registered pattern.

use super::trie::{Slot, Trie};
use crate::registry::TagType;
use crate::sequence::{Modifier, Token};

#[derive(Debug, Clone)]
pub(crate) struct Best<'t> {
    pub ordinal: usize,
    pub wildcards: usize,
    /// Slot that consumed each input token, `None` for literal matches.
    pub bindings: Vec<Option<&'t Slot>>,
}

pub(crate) struct Search<'t, 'i> {
    input: &'i [Token],
    regextime: TagType,
    bindings: Vec<Option<&'t Slot>>,
    best: Option<Best<'t>>,
}

impl<'t, 'i> Search<'t, 'i> {
    pub fn new(input: &'i [Token], regextime: TagType) -> Self {
        Self {
            input,
            regextime,
            bindings: vec![None; input.len()],
            best: None,
        }
    }

    pub fn run(&mut self, trie: &'t Trie) {
        self.walk(trie, Trie::ROOT, 0, 0);
    }

    pub fn finish(self) -> Option<Best<'t>> {
        self.best
    }

    fn walk(&mut self, trie: &'t Trie, node: usize, pos: usize, wildcards: usize) {
        if let Some(best) = &self.best {
            if wildcards > best.wildcards {
                return;
            }
        }
        let n = trie.node(node);
        let input = self.input;
        let len = input.len();

        if pos == len {
            if let Some(ordinal) = n.terminal {
                self.offer(ordinal, wildcards);
            }
        } else {
            let token = &input[pos];
            if token.is_literal() {
                if let Some(&child) = n.literals.get(&token.value) {
                    self.bindings[pos] = None;
                    self.walk(trie, child, pos + 1, wildcards);
                }
            }
        }

        for (slot, child) in &n.slots {
            match slot.modifier {
                Modifier::None => {
                    if pos < len && slot.accepts(&input[pos], self.regextime) {
                        self.bind(slot, pos, 1);
                        self.walk(trie, *child, pos + 1, wildcards + 1);
                    }
                }
                Modifier::Star => {
                    self.walk(trie, *child, pos, wildcards);
                    self.repeat(trie, slot, *child, pos, wildcards);
                }
                Modifier::Plus => self.repeat(trie, slot, *child, pos, wildcards),
                Modifier::Minus => {
                    for end in Self::minus_ends(trie, slot, *child, input, pos) {
                        self.bind(slot, pos, end - pos);
                        self.walk(trie, *child, end, wildcards + end - pos);
                    }
                }
            }
        }
    }

    /// Where a Minus run starting at `pos` may stop. With `until`, before the
    /// first later token equal to it. Without, before any later literal the
    /// child node has an edge for, or at the end of the input. A child with
    /// slots of its own can take over at any later token.
    fn minus_ends(trie: &Trie, slot: &Slot, child: usize, input: &[Token], pos: usize) -> Vec<usize> {
        let len = input.len();
        if pos >= len {
            return Vec::new();
        }
        match &slot.until {
            Some(until) => input[pos + 1..]
                .iter()
                .position(|t| t.value == *until)
                .map(|i| vec![pos + 1 + i])
                .unwrap_or_default(),
            None => {
                let next = trie.node(child);
                (pos + 1..len)
                    .filter(|&end| {
                        !next.slots.is_empty()
                            || (input[end].is_literal() && next.literals.contains_key(&input[end].value))
                    })
                    .chain(std::iter::once(len))
                    .collect()
            }
        }
    }

    /// Greedy one-or-more run of accepted tokens, backing off one at a time.
    fn repeat(&mut self, trie: &'t Trie, slot: &'t Slot, child: usize, pos: usize, wildcards: usize) {
        let regextime = self.regextime;
        let run = self.input[pos..]
            .iter()
            .take_while(|t| slot.accepts(t, regextime))
            .count();
        for n in (1..=run).rev() {
            self.bind(slot, pos, n);
            self.walk(trie, child, pos + n, wildcards + n);
        }
    }

    fn bind(&mut self, slot: &'t Slot, pos: usize, n: usize) {
        for b in &mut self.bindings[pos..pos + n] {
            *b = Some(slot);
        }
    }

    fn offer(&mut self, ordinal: usize, wildcards: usize) {
        let better = match &self.best {
            None => true,
            Some(best) => (wildcards, ordinal) < (best.wildcards, best.ordinal),
        };
        if better {
            self.best = Some(Best {
                ordinal,
                wildcards,
                bindings: self.bindings.clone(),
            });
        }
    }
}
