//! Path resolution and path-based mutation

use serde_json::Value;

use crate::error::{Result, SchemeError};
use crate::node::{NodeId, NodeType};
use crate::options::Entry;
use crate::path::{SchemePath, Segment, Selector};
use crate::scheme::Scheme;
use crate::value::{export_value, sanitize_value, serialize_value, strip_property_name};

impl Scheme {
    /// Resolve a path relative to `at` without changing anything
    ///
    /// Returns `Ok(None)` when the first named segment does not exist.
    ///
    /// # Errors
    /// - [`SchemeError::InvalidPath`] when the path does not parse
    /// - [`SchemeError::ItemNotFound`] for deeper misses and unpicked items
    /// - [`SchemeError::InvalidNode`] for selectors on non-options nodes
    pub fn find(&self, at: NodeId, path: &str) -> Result<Option<Entry>> {
        let path: SchemePath = path.parse()?;
        self.find_path(at, &path)
    }

    /// Parsed form of [`Scheme::find`]
    ///
    /// # Errors
    /// Same as [`Scheme::find`]
    pub fn find_path(&self, at: NodeId, path: &SchemePath) -> Result<Option<Entry>> {
        let mut current = Entry::Node(at);
        for (index, segment) in path.segments().iter().enumerate() {
            let node = self.descend(&current, segment)?;
            let Some(node) = self.step(node, segment, index == 0)? else {
                return Ok(None);
            };
            current = match segment.selector() {
                Some(selector) => self.select(node, selector)?,
                None => Entry::Node(node),
            };
            tracing::trace!("Segment '{}' resolved to {:?}", segment, current);
        }
        Ok(Some(current))
    }

    /// Resolve a path, binding `field=value` segments and picking items
    /// named by selectors on the way
    ///
    /// Wildcard selectors address candidate templates and are read-only.
    ///
    /// # Errors
    /// Same as [`Scheme::find`], plus the errors of [`Scheme::pick`] and
    /// [`Scheme::set_value`], and [`SchemeError::InvalidValue`] for paths
    /// with a `[key=*]` selector
    pub fn resolve(&mut self, at: NodeId, path: &SchemePath) -> Result<Option<Entry>> {
        reject_wildcard(path)?;
        let mut current = Entry::Node(at);
        for (index, segment) in path.segments().iter().enumerate() {
            let node = self.descend(&current, segment)?;
            let Some(node) = self.step(node, segment, index == 0)? else {
                return Ok(None);
            };
            if let Some(binding) = segment.binding() {
                if self.is_leaf(node) {
                    self.assign(node, Value::String(binding.to_string()))?;
                }
            }
            current = match segment.selector() {
                Some(selector) => self.pick(node, &selector.definition(), None)?,
                None => Entry::Node(node),
            };
            tracing::trace!("Segment '{}' resolved to {:?}", segment, current);
        }
        Ok(Some(current))
    }

    /// Strict form of [`Scheme::find`]
    ///
    /// # Errors
    /// Returns [`SchemeError::ItemNotFound`] where `find` returns nothing,
    /// and the errors of `find` otherwise
    pub fn get(&self, at: NodeId, path: &str) -> Result<Entry> {
        self.find(at, path)?
            .ok_or_else(|| self.not_found(at, path))
    }

    /// [`Scheme::get`] for paths that must end at a node
    ///
    /// # Errors
    /// Same as [`Scheme::get`], plus [`SchemeError::InvalidNode`] when the
    /// path ends at a primitive array item
    pub fn get_node(&self, at: NodeId, path: &str) -> Result<NodeId> {
        match self.get(at, path)? {
            Entry::Node(node) => Ok(node),
            Entry::Item(item) => Err(SchemeError::InvalidNode(format!(
                "Item '{path}' is array item '{}', not a node.",
                item.key()
            ))),
        }
    }

    /// Set a value by path
    ///
    /// Options targets pick the value; the returned id is then the picked
    /// item, otherwise `at`. Leaf targets store the value through their
    /// provider after stripping a `name=` prefix.
    ///
    /// # Errors
    /// - [`SchemeError::DuplicateUniqueKey`] when a unique key would take the
    ///   value of an existing item
    /// - [`SchemeError::InvalidNode`] for targets that cannot hold a value
    /// - resolution, pick and provider errors
    pub fn set(&mut self, at: NodeId, path: &str, value: impl Into<Value>) -> Result<NodeId> {
        let value = value.into();
        let parsed: SchemePath = path.parse()?;
        let node = match self.resolve(at, &parsed)? {
            Some(Entry::Node(node)) => node,
            Some(Entry::Item(item)) => {
                return Err(SchemeError::InvalidNode(format!(
                    "Cannot set value of array item '{}'.",
                    item.key()
                )))
            }
            None => return Err(self.not_found(at, path)),
        };

        if self.node_type(node) == NodeType::Options {
            let picked = self.pick_value(node, value)?;
            return Ok(picked.and_then(|entry| entry.as_node()).unwrap_or(at));
        }
        if !self.is_leaf(node) {
            return Err(SchemeError::InvalidNode(format!(
                "Cannot set value of node '{}'.",
                self.path(node)
            )));
        }

        let name = self.name(node).unwrap_or_default().to_string();
        let value = sanitize_value(strip_property_name(&name, value));
        if self.is_unique_key(node) && !value.is_null() {
            if let Some(options) = self.is_in_options(node) {
                let definition = format!("{name}={}", serialize_value(&value));
                if self.lookup_item(options, &definition).is_some() {
                    return Err(SchemeError::DuplicateUniqueKey(format!(
                        "Cannot redefine value of existing unique key '{}'.",
                        self.path(node)
                    )));
                }
            }
        }

        self.set_value(node, value)?;
        self.rekey(node);
        Ok(at)
    }

    /// Remove the item owned by a unique key, or clear a leaf
    ///
    /// # Errors
    /// - resolution errors of [`Scheme::get`]
    /// - [`SchemeError::InvalidValue`] for paths with a `[key=*]` selector
    /// - [`SchemeError::InvalidNode`] for targets without a value
    pub fn unset(&mut self, at: NodeId, path: &str) -> Result<()> {
        reject_wildcard(&path.parse()?)?;
        let node = self.get_node(at, path)?;
        if self.is_unique_key(node) {
            if let (Some(options), Some(item)) = (self.is_in_options(node), self.parent(node)) {
                if self.items(options).contains(&Entry::Node(item)) {
                    return self.remove_item(options, item);
                }
            }
        }
        if self.is_leaf(node) {
            return self.clear_value(node);
        }
        Err(SchemeError::InvalidNode(format!(
            "Cannot unset node '{}'.",
            self.path(node)
        )))
    }

    /// [`Scheme::find`] that treats missing items as absent
    ///
    /// # Errors
    /// Errors other than [`SchemeError::ItemNotFound`]
    pub fn try_find(&self, at: NodeId, path: &str) -> Result<Option<Entry>> {
        match self.find(at, path) {
            Err(err) if err.is_not_found() => {
                tracing::warn!("Ignoring missing item: {}", err);
                Ok(None)
            }
            other => other,
        }
    }

    /// [`Scheme::set`] that skips missing items
    ///
    /// # Errors
    /// Errors other than [`SchemeError::ItemNotFound`]
    pub fn try_set(&mut self, at: NodeId, path: &str, value: impl Into<Value>) -> Result<NodeId> {
        match self.set(at, path, value) {
            Err(err) if err.is_not_found() => {
                tracing::warn!("Ignoring missing item: {}", err);
                Ok(at)
            }
            other => other,
        }
    }

    /// Store a value addressed through a path or form field
    pub(crate) fn assign(&mut self, node: NodeId, value: Value) -> Result<()> {
        let name = self.name(node).unwrap_or_default().to_string();
        self.set_value(node, sanitize_value(strip_property_name(&name, value)))
    }

    /// Pick items named by a value set on options
    pub(crate) fn pick_value(&mut self, options: NodeId, value: Value) -> Result<Option<Entry>> {
        match value {
            Value::String(definition) => self.pick(options, &definition, None).map(Some),
            Value::Array(values) => {
                let mut last = None;
                for value in values {
                    last = self.pick_value(options, value)?;
                }
                Ok(last)
            }
            other if self.contains_primitives(options) && !other.is_null() => {
                self.pick(options, &serialize_value(&other), None).map(Some)
            }
            other => Err(SchemeError::InvalidValue(format!(
                "Cannot pick {} in '{}', use 'field=value'.",
                export_value(&other),
                self.path(options)
            ))),
        }
    }

    fn rekey(&mut self, node: NodeId) {
        if !self.is_unique_key(node) {
            return;
        }
        let Some(item) = self.parent(node) else {
            return;
        };
        if self.key(item).is_none() {
            return;
        }
        let name = self.name(node).unwrap_or_default();
        let key = format!(
            "{name}={}",
            self.value(node).as_ref().map(serialize_value).unwrap_or_default()
        );
        tracing::debug!("Item '{}' re-keyed to '{}'", self.path(item), key);
        self.data_mut(item).key = Some(key);
    }

    fn descend(&self, current: &Entry, segment: &Segment) -> Result<NodeId> {
        match current {
            Entry::Node(node) => Ok(*node),
            Entry::Item(item) => Err(SchemeError::InvalidNode(format!(
                "Cannot resolve '{segment}' inside array item '{}'.",
                item.key()
            ))),
        }
    }

    fn step(&self, current: NodeId, segment: &Segment, first: bool) -> Result<Option<NodeId>> {
        if segment.name().is_empty() {
            return Ok(Some(current));
        }
        match self.child(current, segment.name()) {
            Some(child) => Ok(Some(child)),
            None if first && segment.selector().is_none() => Ok(None),
            None => {
                let prefix = match self.path(current) {
                    path if path.is_empty() => path,
                    path => format!("{path}."),
                };
                let selector = segment.selector().map(ToString::to_string).unwrap_or_default();
                Err(SchemeError::ItemNotFound(format!(
                    "Item '{prefix}{}{selector}' not found.",
                    segment.name()
                )))
            }
        }
    }

    fn select(&self, options: NodeId, selector: &Selector) -> Result<Entry> {
        if self.node_type(options) != NodeType::Options {
            return Err(SchemeError::InvalidNode(format!(
                "Syntax [name=value] is for scheme options only, not for '{}'.",
                self.path(options)
            )));
        }

        if selector.is_wildcard() {
            return self
                .candidate_templates(options)
                .first()
                .map(|&template| Entry::Node(template))
                .ok_or_else(|| {
                    SchemeError::ItemNotFound(format!(
                        "No candidate template in '{}'.",
                        self.path(options)
                    ))
                });
        }

        let definition = selector.definition();
        if let Some(item) = self.lookup_item(options, &definition) {
            return Ok(item);
        }

        let hint = match (selector.value(), self.unique_key_property(options)) {
            (None, Some(unique)) => format!(
                " Did you mean '[{}={definition}]'?",
                self.name(unique).unwrap_or_default()
            ),
            _ => String::new(),
        };
        Err(SchemeError::ItemNotFound(format!(
            "Option '{definition}' in '{}' is not picked up. Try to use pick() or set().{hint}",
            self.path(options)
        )))
    }

    fn not_found(&self, at: NodeId, path: &str) -> SchemeError {
        let scope = if self.parent(at).is_none() {
            String::new()
        } else {
            format!(" in '{}'", self.path(at))
        };
        SchemeError::ItemNotFound(format!("Item '{path}' not found{scope}."))
    }
}

/// Wildcard selectors address candidate templates, which are never written through
fn reject_wildcard(path: &SchemePath) -> Result<()> {
    if path.has_wildcard() {
        return Err(SchemeError::InvalidValue(format!(
            "Path '{path}' addresses a candidate template and cannot be changed. Pick an item first."
        )));
    }
    Ok(())
}
