use std::collections::{HashMap, HashSet};

use crate::{AliasStrategy, Mapping, Node, Sequence};

/// Rewrite repeated subtrees into anchor/alias pairs according to the
/// configured strategy. The first occurrence keeps (or is assigned) an
/// anchor; later occurrences become [`Node::Alias`].
pub(crate) fn apply(node: &Node, strategy: AliasStrategy) -> Node {
    match strategy {
        AliasStrategy::None => node.clone(),
        AliasStrategy::Identity => {
            let mut seen = HashSet::new();
            alias_by_anchor(node, &mut seen)
        }
        AliasStrategy::Value => {
            let mut pass = ValuePass::default();
            pass.count(node);
            pass.rewrite(node)
        }
    }
}

/// Identity strategy: a value tree has no object identity, so two
/// occurrences count as "the same node" when the caller marked both with the
/// same anchor.
fn alias_by_anchor(node: &Node, seen: &mut HashSet<String>) -> Node {
    if let Some(anchor) = node.anchor() {
        if !seen.insert(anchor.to_owned()) {
            return Node::alias(anchor);
        }
    }
    match node {
        Node::Sequence(seq) => Node::Sequence(Sequence {
            items: seq.items.iter().map(|item| alias_by_anchor(item, seen)).collect(),
            ..seq.clone()
        }),
        Node::Mapping(mapping) => rebuild_mapping(mapping, |child| alias_by_anchor(child, seen)),
        node => node.clone(),
    }
}

#[derive(Default)]
struct ValuePass {
    occurrences: HashMap<Node, usize>,
    assigned: HashMap<Node, String>,
    user_anchors: HashSet<String>,
    next_anchor: usize,
}

impl ValuePass {
    /// A node is worth aliasing when it is a collection, or a scalar the
    /// caller already anchored; aliasing every repeated `1` would bloat the
    /// output for nothing.
    fn eligible(node: &Node) -> bool {
        match node {
            Node::Scalar(scalar) => scalar.anchor.is_some(),
            Node::Sequence(_) | Node::Mapping(_) => true,
            Node::Alias(_) => false,
        }
    }

    /// Count how often each eligible subtree will actually be emitted.
    /// Occurrences inside a subtree that will itself collapse into an alias
    /// are not descended into, mirroring the rewrite walk.
    fn count(&mut self, node: &Node) {
        if let Some(anchor) = node.anchor() {
            self.user_anchors.insert(anchor.to_owned());
        }
        if Self::eligible(node) {
            let occurrences = self.occurrences.entry(node.clone()).or_insert(0);
            *occurrences += 1;
            if *occurrences > 1 {
                return;
            }
        }
        match node {
            Node::Sequence(seq) => {
                for item in &seq.items {
                    self.count(item);
                }
            }
            Node::Mapping(mapping) => {
                for (key, value) in mapping.iter() {
                    self.count(key);
                    self.count(value);
                }
            }
            _ => {}
        }
    }

    fn rewrite(&mut self, node: &Node) -> Node {
        if Self::eligible(node) {
            if let Some(anchor) = self.assigned.get(node) {
                return Node::alias(anchor.clone());
            }
            if self.occurrences.get(node).copied().unwrap_or(0) > 1 {
                let anchor = match node.anchor() {
                    Some(anchor) => anchor.to_owned(),
                    None => self.fresh_anchor(),
                };
                self.assigned.insert(node.clone(), anchor.clone());
                return self.rewrite_children(node).with_anchor(anchor);
            }
        }
        self.rewrite_children(node)
    }

    fn rewrite_children(&mut self, node: &Node) -> Node {
        match node {
            Node::Sequence(seq) => Node::Sequence(Sequence {
                items: seq.items.iter().map(|item| self.rewrite(item)).collect(),
                ..seq.clone()
            }),
            Node::Mapping(mapping) => rebuild_mapping(mapping, |child| self.rewrite(child)),
            node => node.clone(),
        }
    }

    /// Anchor names are generated deterministically, in depth-first
    /// pre-order of first duplicated occurrence, skipping names the user
    /// already claimed.
    fn fresh_anchor(&mut self) -> String {
        loop {
            self.next_anchor += 1;
            let anchor = format!("a{}", self.next_anchor);
            if !self.user_anchors.contains(&anchor) {
                return anchor;
            }
        }
    }
}

fn rebuild_mapping(mapping: &Mapping, mut rewrite: impl FnMut(&Node) -> Node) -> Node {
    let mut out = Mapping::new();
    out.tag = mapping.tag.clone();
    out.style = mapping.style;
    out.anchor = mapping.anchor.clone();
    for (key, value) in mapping.iter() {
        // Keys stay unique: rewriting maps equal keys to equal results, and
        // the source mapping had no duplicates.
        let _ = out.insert(rewrite(key), rewrite(value));
    }
    Node::Mapping(out)
}
