//! Depth-first linearization of a tree

use crate::node::{NodeId, NodeType};
use crate::options::Entry;
use crate::scheme::Scheme;

/// Node reached by a [`Traverser`], with its depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Depth, 1 for the starting node
    pub level: usize,
    /// Visited node
    pub node: NodeId,
}

#[derive(Debug)]
enum Step {
    Expand(NodeId, usize),
    Emit(Visit),
}

/// Iterator over properties, picked items and candidate fields
///
/// A property is emitted before its children. Options emit each picked item
/// followed by the item's subtree, then the fields of their candidate
/// template.
#[derive(Debug)]
pub struct Traverser<'a> {
    scheme: &'a Scheme,
    stack: Vec<Step>,
}

impl<'a> Traverser<'a> {
    /// Start at `from` on level 1
    #[must_use]
    pub fn new(scheme: &'a Scheme, from: NodeId) -> Self {
        Self {
            scheme,
            stack: vec![Step::Expand(from, 1)],
        }
    }

    fn expand(&mut self, node: NodeId, level: usize) {
        let scheme = self.scheme;
        let mut steps = Vec::new();

        match scheme.node_type(node) {
            NodeType::Property => steps.push(Step::Emit(Visit { level, node })),
            NodeType::Options => {
                for item in scheme.items(node).iter().filter_map(Entry::as_node) {
                    steps.push(Step::Emit(Visit { level, node: item }));
                    steps.push(Step::Expand(item, level + 1));
                }
                for field in scheme.candidates(node, true).into_values() {
                    steps.push(Step::Emit(Visit {
                        level: level + 1,
                        node: field,
                    }));
                }
            }
            NodeType::Bag | NodeType::Group => {}
        }

        for child in scheme.visible_children(node) {
            steps.push(Step::Expand(child, level + 1));
        }

        self.stack.extend(steps.into_iter().rev());
    }
}

impl Iterator for Traverser<'_> {
    type Item = Visit;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                Step::Emit(visit) => return Some(visit),
                Step::Expand(node, level) => self.expand(node, level),
            }
        }
    }
}

impl Scheme {
    /// Traverse the subtree under `from`
    #[must_use]
    pub fn traverse(&self, from: NodeId) -> Traverser<'_> {
        Traverser::new(self, from)
    }
}
