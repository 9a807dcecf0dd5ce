//! Trie — arena of pattern nodes addressed by index.

use std::collections::HashMap;

use crate::registry::{TagType, TokenType};
use crate::sequence::{Modifier, Sequence, Token};

/// A placeholder edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Slot {
    pub tag: TagType,
    pub ty: TokenType,
    pub modifier: Modifier,
    pub until: Option<String>,
    pub special: Option<String>,
}

impl Slot {
    fn from_token(token: &Token) -> Self {
        Self {
            tag: token.tag,
            ty: token.ty,
            modifier: token.modifier,
            until: token.until.clone(),
            special: token.special.clone(),
        }
    }

    /// Whether a single input token can fill this slot.
    pub fn accepts(&self, token: &Token, regextime: TagType) -> bool {
        if self.ty == TokenType::Time && self.tag == regextime {
            return token.ty == TokenType::Time && token.special == self.special;
        }
        self.ty.accepts(token.ty)
    }

    fn rank(&self) -> u8 {
        match self.modifier {
            Modifier::None => 0,
            Modifier::Star => 1,
            Modifier::Plus => 2,
            Modifier::Minus => 3,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Node {
    pub literals: HashMap<String, usize>,
    /// Ordered plain, star, plus, minus.
    pub slots: Vec<(Slot, usize)>,
    /// Ordinal of the pattern ending here.
    pub terminal: Option<usize>,
}

#[derive(Debug)]
pub(crate) struct Trie {
    nodes: Vec<Node>,
}

impl Default for Trie {
    fn default() -> Self {
        Self { nodes: vec![Node::default()] }
    }
}

impl Trie {
    pub const ROOT: usize = 0;

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// Add a pattern path. When an identical path already ends in a pattern,
    /// that pattern keeps the node and its ordinal is returned.
    pub fn insert(&mut self, pattern: &Sequence, ordinal: usize) -> Option<usize> {
        let mut node = Self::ROOT;
        for token in pattern.iter() {
            node = if token.is_literal() {
                self.literal_child(node, &token.value)
            } else {
                self.slot_child(node, Slot::from_token(token))
            };
        }
        match self.nodes[node].terminal {
            Some(existing) => Some(existing),
            None => {
                self.nodes[node].terminal = Some(ordinal);
                None
            }
        }
    }

    fn literal_child(&mut self, node: usize, value: &str) -> usize {
        if let Some(&child) = self.nodes[node].literals.get(value) {
            return child;
        }
        let child = self.push_node();
        self.nodes[node].literals.insert(value.to_string(), child);
        child
    }

    fn slot_child(&mut self, node: usize, slot: Slot) -> usize {
        if let Some((_, child)) = self.nodes[node].slots.iter().find(|(s, _)| *s == slot) {
            return *child;
        }
        let child = self.push_node();
        let slots = &mut self.nodes[node].slots;
        let at = slots
            .iter()
            .position(|(s, _)| s.rank() > slot.rank())
            .unwrap_or(slots.len());
        slots.insert(at, (slot, child));
        child
    }

    fn push_node(&mut self) -> usize {
        self.nodes.push(Node::default());
        self.nodes.len() - 1
    }
}
