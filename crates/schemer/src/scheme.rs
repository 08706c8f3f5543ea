//! The scheme arena
//!
//! A [`Scheme`] owns every node of one tree in a flat arena. Nodes refer to
//! each other by [`NodeId`]; parent links are plain indices and never imply
//! ownership. Removing an item releases its whole subtree.

use crate::builder::Decl;
use crate::config::SchemeConfig;
use crate::error::Result;
use crate::node::{NodeData, NodeId, NodeKind};

/// Self-describing configuration tree
///
/// # Panics
/// Accessing a node through an id that was released (for example a removed
/// options item) panics, the same way indexing a freed arena slot does.
#[derive(Debug, Clone)]
pub struct Scheme {
    nodes: Vec<Option<NodeData>>,
    root: NodeId,
    config: SchemeConfig,
}

impl Scheme {
    /// Build a tree from a declaration with default config
    ///
    /// # Errors
    /// Returns the first structural error found while loading the declaration
    pub fn new(decl: impl Into<Decl>) -> Result<Self> {
        Self::with_config(decl, SchemeConfig::default())
    }

    /// Build a tree from a declaration
    ///
    /// The root is not attached to anything, so a root options node skips
    /// the structural validation performed on attachment.
    ///
    /// # Errors
    /// Returns the first structural error found while loading the declaration
    pub fn with_config(decl: impl Into<Decl>, config: SchemeConfig) -> Result<Self> {
        let mut scheme = Self {
            nodes: Vec::new(),
            root: NodeId::new(0),
            config,
        };
        scheme.root = scheme.load(decl.into(), None)?;
        Ok(scheme)
    }

    /// Root node
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SchemeConfig {
        &self.config
    }

    /// Replace configuration
    #[inline]
    pub fn set_config(&mut self, config: SchemeConfig) {
        self.config = config;
    }

    /// Check if the id refers to a live node
    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.index()), Some(Some(_)))
    }

    /// Number of live nodes, including templates and conditional payloads
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Check if the arena holds no live node
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Some(data));
        id
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        match self.nodes.get(id.index()) {
            Some(Some(data)) => data,
            _ => panic!("node {id} was released or never existed"),
        }
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        match self.nodes.get_mut(id.index()) {
            Some(Some(data)) => data,
            _ => panic!("node {id} was released or never existed"),
        }
    }

    /// Free a node and everything it owns
    pub(crate) fn release(&mut self, id: NodeId) {
        let Some(data) = self.nodes.get_mut(id.index()).and_then(Option::take) else {
            return;
        };
        for owned in data.kind.owned() {
            self.release(owned);
        }
    }

    /// Replace the kind of a freshly allocated node
    pub(crate) fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.data_mut(id).kind = kind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{bag, candidates, property};

    #[test]
    fn new_scheme_has_root() {
        let scheme = Scheme::new(bag([property("a"), property("b")])).unwrap();
        assert!(scheme.contains(scheme.root()));
        assert_eq!(scheme.len(), 3);
        assert!(!scheme.is_empty());
    }

    #[test]
    fn config_is_kept() {
        let config = SchemeConfig::new().with_pretty_json(true);
        let scheme = Scheme::with_config(bag([property("a")]), config).unwrap();
        assert!(scheme.config().pretty_json);
    }

    #[test]
    fn release_frees_subtree() {
        let mut scheme = Scheme::new(candidates(
            "draws",
            [bag([property("id").unique_key(), property("name")])],
        ))
        .unwrap();
        let item = scheme.pick(scheme.root(), "id", Some(1.into())).unwrap();
        let item = item.as_node().unwrap();
        let before = scheme.len();
        scheme.release(item);
        assert!(!scheme.contains(item));
        assert_eq!(scheme.len(), before - 3);
    }

    #[test]
    #[should_panic(expected = "was released")]
    fn released_access_panics() {
        let mut scheme = Scheme::new(bag([property("a")])).unwrap();
        let root = scheme.root();
        scheme.release(root);
        let _ = scheme.data(root);
    }
}
