//! Options: static arrays and repeatable candidate templates
//!
//! An options node works in one of two modes, fixed by its first entry:
//! - *primitive*: items and candidates are scalar [`ArrayItem`]s
//! - *structural*: items are instances of a single candidate template,
//!   identified by the template's unique key property
//!
//! [`Scheme::pick`] is the only way structural items come into existence.

use indexmap::IndexMap;
use serde_json::Value;

use crate::array_item::{type_name, ArrayItem};
use crate::builder::OptionEntry;
use crate::error::{Result, SchemeError};
use crate::node::{NodeId, NodeKind, NodeType};
use crate::provider::ManyValuesProvider;
use crate::scheme::Scheme;
use crate::value::{sanitize_value, serialize_value, strip_property_name};

/// Item of an options node, or the target of a path
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// Tree node
    Node(NodeId),
    /// Scalar item of primitive options
    Item(ArrayItem),
}

impl Entry {
    /// Node id, if the entry is a node
    #[inline]
    #[must_use]
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(*id),
            Self::Item(_) => None,
        }
    }

    /// Array item, if the entry is one
    #[inline]
    #[must_use]
    pub fn as_item(&self) -> Option<&ArrayItem> {
        match self {
            Self::Item(item) => Some(item),
            Self::Node(_) => None,
        }
    }
}

/// Type of scalar items; primitive options never mix them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarKind {
    Null,
    Boolean,
    Integer,
    Double,
    String,
}

impl ScalarKind {
    fn of(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_f64() => Self::Double,
            Value::Number(_) => Self::Integer,
            Value::String(_) => Self::String,
            _ => Self::Null,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::String => "string",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum OptionsMode {
    Undecided,
    Primitive {
        kind: ScalarKind,
        candidates: Vec<ArrayItem>,
        items: Vec<ArrayItem>,
    },
    Structural {
        candidates: Vec<NodeId>,
        items: Vec<NodeId>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct OptionsNode {
    pub(crate) name: String,
    pub(crate) mode: OptionsMode,
    pub(crate) associative: Option<bool>,
}

impl OptionsNode {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            mode: OptionsMode::Undecided,
            associative: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Items,
    Candidates,
}

/// Split `field=value` definitions; an embedded value wins
fn split_definition(definition: &str, value: Option<Value>) -> (String, Option<Value>) {
    match definition.split_once('=') {
        Some((field, value)) => (field.to_string(), Some(Value::String(value.to_string()))),
        None => (definition.to_string(), value),
    }
}

/// Item key of a submitted value, after the same clean-up values get when stored
fn item_key(value: &Value) -> String {
    serialize_value(&sanitize_value(value.clone()))
}

/// Declared and cleaned-up forms of a primitive pick key
fn primitive_keys(field: &str, value: Option<&Value>) -> (String, String) {
    match value {
        Some(value) => (serialize_value(value), item_key(value)),
        None => (field.to_string(), item_key(&Value::String(field.to_string()))),
    }
}

impl Scheme {
    fn options_node(&self, id: NodeId) -> Result<&OptionsNode> {
        match &self.data(id).kind {
            NodeKind::Options(opts) => Ok(opts),
            _ => Err(SchemeError::InvalidNode(format!(
                "Syntax [name=value] is for scheme options only, not for '{}'.",
                self.path(id)
            ))),
        }
    }

    fn options_node_mut(&mut self, id: NodeId) -> Result<&mut OptionsNode> {
        self.options_node(id)?;
        match &mut self.data_mut(id).kind {
            NodeKind::Options(opts) => Ok(opts),
            _ => Err(SchemeError::InvalidNode(format!("Node {id} is not options."))),
        }
    }

    /// Check for primitive mode
    #[must_use]
    pub fn contains_primitives(&self, id: NodeId) -> bool {
        matches!(
            self.options_node(id).map(|opts| &opts.mode),
            Ok(OptionsMode::Primitive { .. })
        )
    }

    /// Picked or statically declared items
    #[must_use]
    pub fn items(&self, id: NodeId) -> Vec<Entry> {
        match self.options_node(id).map(|opts| &opts.mode) {
            Ok(OptionsMode::Primitive { items, .. }) => items.iter().cloned().map(Entry::Item).collect(),
            Ok(OptionsMode::Structural { items, .. }) => items.iter().copied().map(Entry::Node).collect(),
            _ => Vec::new(),
        }
    }

    /// Candidate templates of structural options
    #[must_use]
    pub fn candidate_templates(&self, id: NodeId) -> Vec<NodeId> {
        match self.options_node(id).map(|opts| &opts.mode) {
            Ok(OptionsMode::Structural { candidates, .. }) => candidates.clone(),
            _ => Vec::new(),
        }
    }

    /// Keys of primitive candidates
    #[must_use]
    pub fn candidate_keys(&self, id: NodeId) -> Vec<String> {
        match self.options_node(id).map(|opts| &opts.mode) {
            Ok(OptionsMode::Primitive { candidates, .. }) => {
                candidates.iter().map(|c| c.key().to_string()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Leaf fields of the candidate templates, by name
    ///
    /// With `sort_by_priority` the unique key comes first, then fields with
    /// conditional siblings, then the rest. Bulk initialization relies on
    /// this order.
    #[must_use]
    pub fn candidates(&self, id: NodeId, sort_by_priority: bool) -> IndexMap<String, NodeId> {
        let fields: IndexMap<String, NodeId> = self
            .candidate_templates(id)
            .into_iter()
            .flat_map(|template| self.visible_children(template))
            .filter(|&field| self.is_leaf(field))
            .filter_map(|field| self.name(field).map(|name| (name.to_string(), field)))
            .collect();

        if !sort_by_priority {
            return fields;
        }

        let (unique, rest): (IndexMap<_, _>, IndexMap<_, _>) = fields
            .into_iter()
            .partition(|(_, field)| self.is_unique_key(*field));
        let (conditional, rest): (IndexMap<_, _>, IndexMap<_, _>) = rest
            .into_iter()
            .partition(|(_, field)| self.has_conditional_siblings(*field));

        unique.into_iter().chain(conditional).chain(rest).collect()
    }

    /// Unique key field of the candidate template
    #[must_use]
    pub fn unique_key_property(&self, id: NodeId) -> Option<NodeId> {
        self.candidates(id, true)
            .values()
            .next()
            .copied()
            .filter(|&field| self.is_unique_key(field))
    }

    /// Append an item
    ///
    /// # Errors
    /// Returns [`SchemeError::InvalidValue`] when the entry does not fit the
    /// mode or keying of the existing entries
    pub fn add_item(&mut self, id: NodeId, entry: impl Into<OptionEntry>) -> Result<()> {
        self.push_entry(id, entry.into(), Slot::Items)
    }

    /// Append a candidate
    ///
    /// # Errors
    /// Same as [`Scheme::add_item`]
    pub fn add_candidate(&mut self, id: NodeId, entry: impl Into<OptionEntry>) -> Result<()> {
        self.push_entry(id, entry.into(), Slot::Candidates)
    }

    /// Replace all items
    ///
    /// # Errors
    /// Same as [`Scheme::add_item`]
    pub fn set_items<I>(&mut self, id: NodeId, entries: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<OptionEntry>,
    {
        self.reset(id, false)?;
        for entry in entries {
            self.add_item(id, entry)?;
        }
        Ok(())
    }

    /// Replace all candidates (and items)
    ///
    /// # Errors
    /// Same as [`Scheme::add_item`]
    pub fn set_candidates<I>(&mut self, id: NodeId, entries: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<OptionEntry>,
    {
        self.clear(id)?;
        for entry in entries {
            self.add_candidate(id, entry)?;
        }
        Ok(())
    }

    /// Replace items with the values of a many-values provider
    ///
    /// # Errors
    /// Same as [`Scheme::add_item`]
    pub fn set_items_from(&mut self, id: NodeId, provider: &dyn ManyValuesProvider) -> Result<()> {
        self.set_items(id, OptionEntry::from_provider(provider))
    }

    /// Drop items; with `hard` (or without candidates) drop candidates and
    /// forget the mode as well
    ///
    /// # Errors
    /// Returns [`SchemeError::InvalidNode`] for non-options nodes
    pub fn reset(&mut self, id: NodeId, hard: bool) -> Result<()> {
        let opts = self.options_node_mut(id)?;
        let mut released = Vec::new();
        let forget = match &mut opts.mode {
            OptionsMode::Undecided => true,
            OptionsMode::Primitive { candidates, items, .. } => {
                items.clear();
                if hard {
                    candidates.clear();
                }
                candidates.is_empty()
            }
            OptionsMode::Structural { candidates, items } => {
                released.append(items);
                if hard {
                    released.append(candidates);
                }
                candidates.is_empty()
            }
        };
        if forget {
            opts.mode = OptionsMode::Undecided;
            opts.associative = None;
        }
        for node in released {
            self.release(node);
        }
        Ok(())
    }

    /// Drop items and candidates
    ///
    /// # Errors
    /// Returns [`SchemeError::InvalidNode`] for non-options nodes
    pub fn clear(&mut self, id: NodeId) -> Result<()> {
        self.reset(id, true)
    }

    /// Remove a structural item and release its subtree
    ///
    /// # Errors
    /// - [`SchemeError::InvalidNode`] for non-options nodes
    /// - [`SchemeError::ItemNotFound`] when `item` is not an item of `id`
    pub fn remove_item(&mut self, id: NodeId, item: NodeId) -> Result<()> {
        let opts = self.options_node_mut(id)?;
        let removed = match &mut opts.mode {
            OptionsMode::Structural { items, .. } => match items.iter().position(|&i| i == item) {
                Some(pos) => {
                    items.remove(pos);
                    true
                }
                None => false,
            },
            _ => false,
        };
        if !removed {
            return Err(SchemeError::ItemNotFound(format!(
                "Node {item} is not an item of '{}'.",
                self.path(id)
            )));
        }
        tracing::debug!("Removing item '{}'", self.path(item));
        self.release(item);
        Ok(())
    }

    /// Remove a primitive item by key
    ///
    /// # Errors
    /// - [`SchemeError::InvalidNode`] for non-options nodes
    /// - [`SchemeError::ItemNotFound`] when no item has the key
    pub fn remove_array_item(&mut self, id: NodeId, key: &str) -> Result<ArrayItem> {
        let opts = self.options_node_mut(id)?;
        let removed = match &mut opts.mode {
            OptionsMode::Primitive { items, .. } => items
                .iter()
                .position(|i| i.key() == key)
                .map(|pos| items.remove(pos)),
            _ => None,
        };
        removed.ok_or_else(|| {
            SchemeError::ItemNotFound(format!("Item '{key}' not found in '{}'.", self.path(id)))
        })
    }

    /// Check for a picked item matching the definition
    #[must_use]
    pub fn has_picked(&self, id: NodeId, definition: &str) -> bool {
        self.lookup_item(id, definition).is_some()
    }

    /// Existing item matching a pick definition
    pub(crate) fn lookup_item(&self, id: NodeId, definition: &str) -> Option<Entry> {
        let (field, value) = split_definition(definition, None);
        self.lookup(id, &field, value.as_ref())
    }

    fn lookup(&self, id: NodeId, field: &str, value: Option<&Value>) -> Option<Entry> {
        let opts = self.options_node(id).ok()?;
        match &opts.mode {
            OptionsMode::Primitive { items, .. } => {
                let (raw, key) = primitive_keys(field, value);
                items
                    .iter()
                    .find(|i| i.key() == raw || i.key() == key)
                    .cloned()
                    .map(Entry::Item)
            }
            OptionsMode::Structural { items, .. } => {
                let key = match value {
                    Some(value) => format!("{field}={}", item_key(value)),
                    None => field.to_string(),
                };
                items
                    .iter()
                    .find(|&&i| self.key(i) == Some(key.as_str()))
                    .copied()
                    .map(Entry::Node)
            }
            OptionsMode::Undecided => None,
        }
    }

    /// Select an existing item or materialize one from a candidate
    ///
    /// `definition` is either a field name (with `value` supplied
    /// separately) or `field=value`. In primitive mode the value (or the bare
    /// definition) is the key of the candidate to pick.
    ///
    /// Picking is idempotent: an item whose key matches is returned as is.
    ///
    /// # Errors
    /// - [`SchemeError::InvalidNode`] for non-options nodes, or when the
    ///   definition names something else than a property
    /// - [`SchemeError::InvalidValue`] when the value is rejected, or missing
    ///   in structural mode
    /// - [`SchemeError::ItemNotFound`] when no candidate matches
    pub fn pick(&mut self, id: NodeId, definition: &str, value: Option<Value>) -> Result<Entry> {
        let (field, value) = split_definition(definition, value);
        if let Some(existing) = self.lookup(id, &field, value.as_ref()) {
            return Ok(existing);
        }

        let def = match &value {
            Some(value) => format!("{field}={}", item_key(value)),
            None => field.clone(),
        };

        let picked = match &self.options_node(id)?.mode {
            OptionsMode::Primitive { .. } => {
                let (raw, key) = primitive_keys(&field, value.as_ref());
                self.pick_primitive(id, &raw, &key)?
            }
            OptionsMode::Structural { candidates, .. } => {
                let candidates = candidates.clone();
                let Some(value) = value else {
                    return Err(SchemeError::InvalidValue(format!(
                        "Option '{def}' in '{}' cannot be picked without a value.",
                        self.path(id)
                    )));
                };
                self.pick_structural(id, &candidates, &field, value)?
            }
            OptionsMode::Undecided => None,
        };

        match picked {
            Some(entry) => {
                tracing::debug!("Picked '{}' in '{}'", def, self.path(id));
                Ok(entry)
            }
            None => Err(SchemeError::ItemNotFound(format!(
                "Option '{def}' not found in '{}'.",
                self.path(id)
            ))),
        }
    }

    fn pick_primitive(&mut self, id: NodeId, raw: &str, key: &str) -> Result<Option<Entry>> {
        let opts = self.options_node_mut(id)?;
        let OptionsMode::Primitive { candidates, items, .. } = &mut opts.mode else {
            return Ok(None);
        };
        let Some(found) = candidates
            .iter()
            .find(|c| c.key() == raw || c.key() == key)
            .cloned()
        else {
            return Ok(None);
        };
        items.push(found.clone());
        Ok(Some(Entry::Item(found)))
    }

    fn pick_structural(
        &mut self,
        id: NodeId,
        candidates: &[NodeId],
        field: &str,
        value: Value,
    ) -> Result<Option<Entry>> {
        for &template in candidates {
            let Some(target) = self.try_find(template, field)? else {
                continue;
            };
            let target = match target {
                Entry::Node(node) if self.node_type(node) == NodeType::Property => node,
                Entry::Node(node) => {
                    return Err(SchemeError::InvalidNode(format!(
                        "Node '{}' is not a Property.",
                        self.path(node)
                    )))
                }
                Entry::Item(item) => {
                    return Err(SchemeError::InvalidNode(format!(
                        "Array item '{}' is not a Property.",
                        item.key()
                    )))
                }
            };

            let copy = self.deep_copy(template, Some(id));
            if let Err(err) = self.fill_picked(copy, target, field, &value) {
                self.release(copy);
                return Err(err);
            }

            if let NodeKind::Options(opts) = &mut self.data_mut(id).kind {
                if let OptionsMode::Structural { items, .. } = &mut opts.mode {
                    items.push(copy);
                }
            }
            return Ok(Some(Entry::Node(copy)));
        }
        Ok(None)
    }

    fn fill_picked(&mut self, copy: NodeId, template_field: NodeId, field: &str, value: &Value) -> Result<()> {
        let target = self.get_node(copy, field)?;
        let name = self.name(target).unwrap_or_default().to_string();
        let stored = sanitize_value(strip_property_name(&name, value.clone()));
        let key = format!("{name}={}", serialize_value(&stored));
        self.set_value(target, stored)?;
        if self.is_unique_key(template_field) {
            self.data_mut(copy).key = Some(key);
        }
        Ok(())
    }

    /// Validate structural options on attachment
    ///
    /// Structural options with candidates need exactly one template with
    /// exactly one unique key property. Options holding only static object
    /// items have no template to check; picking from them finds nothing.
    pub(crate) fn validate_declaration(&self, id: NodeId) -> Result<()> {
        let Ok(opts) = self.options_node(id) else {
            return Ok(());
        };
        let OptionsMode::Structural { candidates, .. } = &opts.mode else {
            return Ok(());
        };
        let template = match candidates.as_slice() {
            [] => return Ok(()),
            [template] => *template,
            _ => {
                return Err(SchemeError::InvalidNode(
                    "Multiple candidates not supported.".into(),
                ))
            }
        };

        let unique_keys = self
            .visible_children(template)
            .into_iter()
            .filter(|&field| self.is_unique_key(field))
            .count();

        match unique_keys {
            1 => Ok(()),
            0 => Err(SchemeError::InvalidUniqueKey(format!(
                "One of the properties in '{}' must be set as unique key.",
                self.path(id)
            ))),
            _ => Err(SchemeError::InvalidUniqueKey(format!(
                "Multiple unique keys in '{}' are not supported.",
                self.path(id)
            ))),
        }
    }

    fn push_entry(&mut self, id: NodeId, entry: OptionEntry, slot: Slot) -> Result<()> {
        match entry {
            OptionEntry::Scalar { key, value } => {
                let key = self.sanitize_array_key(id, key)?;
                let item = ArrayItem::new(value, key)?;
                let kind = ScalarKind::of(item.value());
                let opts = self.options_node_mut(id)?;
                if matches!(opts.mode, OptionsMode::Undecided) {
                    opts.mode = OptionsMode::Primitive {
                        kind,
                        candidates: Vec::new(),
                        items: Vec::new(),
                    };
                }
                match &mut opts.mode {
                    OptionsMode::Primitive {
                        kind: existing,
                        candidates,
                        items,
                    } if *existing == kind => {
                        match slot {
                            Slot::Items => items.push(item),
                            Slot::Candidates => candidates.push(item),
                        }
                        Ok(())
                    }
                    OptionsMode::Primitive { kind: existing, .. } => Err(SchemeError::InvalidValue(format!(
                        "Cannot mix types of items ({} vs. {}).",
                        existing.label(),
                        kind.label()
                    ))),
                    _ => Err(SchemeError::InvalidValue(format!(
                        "Cannot mix types of items (node vs. {}).",
                        type_name(item.value())
                    ))),
                }
            }
            OptionEntry::Node(decl) => {
                self.sanitize_array_key(id, None)?;
                let opts = self.options_node_mut(id)?;
                match opts.mode {
                    OptionsMode::Undecided => {
                        opts.mode = OptionsMode::Structural {
                            candidates: Vec::new(),
                            items: Vec::new(),
                        };
                    }
                    OptionsMode::Primitive { kind, .. } => {
                        return Err(SchemeError::InvalidValue(format!(
                            "Cannot mix types of items ({} vs. node).",
                            kind.label()
                        )))
                    }
                    OptionsMode::Structural { .. } => {}
                }

                let node = self.load(decl, Some(id))?;
                if let NodeKind::Options(opts) = &mut self.data_mut(id).kind {
                    if let OptionsMode::Structural { candidates, items } = &mut opts.mode {
                        match slot {
                            Slot::Items => items.push(node),
                            Slot::Candidates => candidates.push(node),
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn sanitize_array_key(&mut self, id: NodeId, key: Option<String>) -> Result<Option<String>> {
        let key = key.filter(|k| !k.is_empty());
        let opts = self.options_node_mut(id)?;
        let associative = key.is_some();
        if opts.associative.is_some_and(|a| a != associative) {
            return Err(SchemeError::InvalidValue(
                "Cannot mix associative and non-associative keys.".into(),
            ));
        }
        opts.associative = Some(associative);
        Ok(key)
    }
}
