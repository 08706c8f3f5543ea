//! Node identity, ownership and generic navigation

use std::fmt::{self, Display, Formatter, Write as _};

use indexmap::IndexMap;

use crate::builder::Decl;
use crate::error::{Result, SchemeError};
use crate::options::{OptionsMode, OptionsNode};
use crate::property::{PropertyBody, PropertyNode};
use crate::scheme::Scheme;

/// Named children in declaration order
pub(crate) type Children = IndexMap<String, NodeId>;

/// Stable index of a node within its [`Scheme`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Anonymous container (root, candidate template, picked item)
    Bag,
    /// Named leaf or bag
    Property,
    /// Named collection of items
    Options,
    /// Anonymous tuple of conditional siblings
    Group,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) parent: Option<NodeId>,
    pub(crate) key: Option<String>,
    pub(crate) kind: NodeKind,
}

impl NodeData {
    pub(crate) fn new(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            key: None,
            kind: NodeKind::Bag(Children::new()),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Bag(Children),
    Property(PropertyNode),
    Options(OptionsNode),
    Group(Vec<NodeId>),
}

impl NodeKind {
    pub(crate) fn name(&self) -> Option<&str> {
        match self {
            Self::Property(prop) => Some(&prop.name),
            Self::Options(opts) => Some(&opts.name),
            Self::Bag(_) | Self::Group(_) => None,
        }
    }

    pub(crate) fn node_type(&self) -> NodeType {
        match self {
            Self::Bag(_) => NodeType::Bag,
            Self::Property(_) => NodeType::Property,
            Self::Options(_) => NodeType::Options,
            Self::Group(_) => NodeType::Group,
        }
    }

    /// Direct named children, `None` for nodes that cannot hold any
    pub(crate) fn children(&self) -> Option<&Children> {
        match self {
            Self::Bag(children)
            | Self::Property(PropertyNode {
                body: PropertyBody::Bag(children),
                ..
            }) => Some(children),
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Children> {
        match self {
            Self::Bag(children)
            | Self::Property(PropertyNode {
                body: PropertyBody::Bag(children),
                ..
            }) => Some(children),
            _ => None,
        }
    }

    /// Every node released together with this one
    pub(crate) fn owned(&self) -> Vec<NodeId> {
        match self {
            Self::Bag(children) => children.values().copied().collect(),
            Self::Property(prop) => {
                let mut owned: Vec<NodeId> = match &prop.body {
                    PropertyBody::Bag(children) => children.values().copied().collect(),
                    PropertyBody::Leaf(_) => Vec::new(),
                };
                owned.extend(prop.conditions.values().copied());
                owned
            }
            Self::Options(opts) => match &opts.mode {
                OptionsMode::Structural { candidates, items } => {
                    candidates.iter().chain(items).copied().collect()
                }
                OptionsMode::Undecided | OptionsMode::Primitive { .. } => Vec::new(),
            },
            Self::Group(members) => members.clone(),
        }
    }
}

impl Scheme {
    /// Kind of a node
    #[must_use]
    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.data(id).kind.node_type()
    }

    /// Parent node (non-owning)
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    /// Runtime key of an item
    #[must_use]
    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.data(id).key.as_deref()
    }

    /// Key of the node or of its nearest keyed ancestor
    #[must_use]
    pub fn any_key(&self, id: NodeId) -> Option<&str> {
        let mut current = Some(id);
        while let Some(node) = current {
            let data = self.data(node);
            if let Some(key) = data.key.as_deref() {
                return Some(key);
            }
            current = data.parent;
        }
        None
    }

    /// Name of a property or options node
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.data(id).kind.name()
    }

    /// Direct children plus the inlined conditional siblings of determined
    /// properties
    ///
    /// # Errors
    /// Returns [`SchemeError::UndeterminedProperty`] when a property with
    /// conditional siblings has no value and `omit_undetermined` is false
    pub fn children(&self, id: NodeId, omit_undetermined: bool) -> Result<Vec<NodeId>> {
        let Some(direct) = self.data(id).kind.children() else {
            return Ok(Vec::new());
        };

        let mut children = Vec::with_capacity(direct.len());
        for &child in direct.values() {
            children.push(child);
            match self.determined_siblings(child) {
                Some(siblings) => children.extend(siblings),
                None if omit_undetermined => {}
                None => return Err(self.undetermined(child)),
            }
        }
        Ok(children)
    }

    /// Children visible right now, undetermined siblings left out
    #[must_use]
    pub fn visible_children(&self, id: NodeId) -> Vec<NodeId> {
        let Some(direct) = self.data(id).kind.children() else {
            return Vec::new();
        };

        let mut children = Vec::with_capacity(direct.len());
        for &child in direct.values() {
            children.push(child);
            children.extend(self.determined_siblings(child).unwrap_or_default());
        }
        children
    }

    /// Named child, conditional siblings included
    #[must_use]
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.visible_children(id)
            .into_iter()
            .find(|&child| self.name(child) == Some(name))
    }

    /// Canonical path of a node
    ///
    /// Properties of an un-keyed bag inside structural options (the
    /// candidate template) use the wildcard form `options[key=*].name`.
    #[must_use]
    pub fn path(&self, id: NodeId) -> String {
        if let Some(path) = self.wildcard_path(id) {
            return path;
        }

        let data = self.data(id);
        let mut path = data.parent.map(|p| self.path(p)).unwrap_or_default();
        if let Some(key) = &data.key {
            let _ = write!(path, "[{key}]");
        }
        match data.kind.name() {
            Some(name) if path.is_empty() => name.to_string(),
            Some(name) => format!("{path}.{name}"),
            None => path,
        }
    }

    fn wildcard_path(&self, id: NodeId) -> Option<String> {
        let data = self.data(id);
        let NodeKind::Property(prop) = &data.kind else {
            return None;
        };
        let wrapper = data.parent?;
        if self.data(wrapper).key.is_some() {
            return None;
        }
        let options = self.data(wrapper).parent?;
        if self.node_type(options) != NodeType::Options {
            return None;
        }
        let unique = self.unique_key_property(options)?;
        Some(format!(
            "{}[{}=*].{}",
            self.path(options),
            self.name(unique)?,
            prop.name
        ))
    }

    /// Attach a named declaration under a bag
    ///
    /// # Errors
    /// - [`SchemeError::InvalidNode`] for anonymous declarations or parents
    ///   that cannot hold children
    /// - [`SchemeError::ExistingName`] when the name is already taken
    /// - structural errors of the declaration itself
    pub fn add(&mut self, parent: NodeId, decl: impl Into<Decl>) -> Result<NodeId> {
        let decl = decl.into();
        if self.data(parent).kind.children().is_none() {
            return Err(SchemeError::InvalidNode(format!(
                "Node '{}' cannot hold children.",
                self.path(parent)
            )));
        }
        let child = self.attach(parent, decl)?;
        tracing::debug!("Added '{}'", self.path(child));
        Ok(child)
    }

    pub(crate) fn attach(&mut self, parent: NodeId, decl: Decl) -> Result<NodeId> {
        let Some(name) = decl.name().map(str::to_string) else {
            return Err(SchemeError::InvalidNode(format!(
                "Scheme node must be named (e.g. Property or Options), {} given.",
                decl.type_name()
            )));
        };

        let taken = self
            .data(parent)
            .kind
            .children()
            .is_some_and(|children| children.contains_key(&name));
        if taken {
            return Err(SchemeError::ExistingName(format!(
                "Property '{name}' already exists in this node."
            )));
        }

        let child = self.load_named(decl, Some(parent))?;
        if let Some(children) = self.data_mut(parent).kind.children_mut() {
            children.insert(name, child);
        }
        Ok(child)
    }

    /// Independent copy of a subtree placed under `parent`
    ///
    /// Children, conditional payloads, option candidates and items and
    /// value providers are copied. Providers are rebound to the copies.
    pub fn deep_copy(&mut self, id: NodeId, parent: Option<NodeId>) -> NodeId {
        let source = self.data(id).clone();
        let copy = self.alloc(NodeData {
            parent,
            key: source.key,
            kind: NodeKind::Bag(Children::new()),
        });

        let kind = match source.kind {
            NodeKind::Bag(children) => NodeKind::Bag(self.copy_children(&children, copy)),
            NodeKind::Property(mut prop) => {
                if let PropertyBody::Bag(children) = &prop.body {
                    prop.body = PropertyBody::Bag(self.copy_children(children, copy));
                }
                prop.conditions = prop
                    .conditions
                    .into_iter()
                    .map(|(trigger, payload)| {
                        let owner = if self.node_type(payload) == NodeType::Group {
                            Some(copy)
                        } else {
                            parent
                        };
                        (trigger, self.deep_copy(payload, owner))
                    })
                    .collect();
                NodeKind::Property(prop)
            }
            NodeKind::Options(mut opts) => {
                if let OptionsMode::Structural { candidates, items } = &opts.mode {
                    opts.mode = OptionsMode::Structural {
                        candidates: candidates
                            .iter()
                            .map(|&c| self.deep_copy(c, Some(copy)))
                            .collect(),
                        items: items.iter().map(|&i| self.deep_copy(i, Some(copy))).collect(),
                    };
                }
                NodeKind::Options(opts)
            }
            NodeKind::Group(members) => {
                let member_parent = parent.and_then(|owner| self.parent(owner));
                NodeKind::Group(
                    members
                        .iter()
                        .map(|&m| self.deep_copy(m, member_parent))
                        .collect(),
                )
            }
        };

        self.set_kind(copy, kind);
        self.bind_provider(copy);
        copy
    }

    fn copy_children(&mut self, children: &Children, parent: NodeId) -> Children {
        children
            .iter()
            .map(|(name, &child)| (name.clone(), self.deep_copy(child, Some(parent))))
            .collect()
    }
}
