//! Properties: named leaves and bags with conditional siblings

use indexmap::IndexMap;
use serde_json::Value;

use crate::array_item::type_name;
use crate::builder::Decl;
use crate::error::{Result, SchemeError};
use crate::node::{Children, NodeId, NodeKind, NodeType};
use crate::provider::{PropertyHandle, ValueProvider};
use crate::scheme::Scheme;
use crate::value::{conditional_key, export_value, non_null};

#[derive(Debug, Clone)]
pub(crate) struct PropertyNode {
    pub(crate) name: String,
    pub(crate) body: PropertyBody,
    pub(crate) unique_key: bool,
    /// Trigger key -> payload (a group or a single named node)
    pub(crate) conditions: IndexMap<String, NodeId>,
}

impl PropertyNode {
    pub(crate) fn is_bag(&self) -> bool {
        matches!(self.body, PropertyBody::Bag(_))
    }
}

#[derive(Debug, Clone)]
pub(crate) enum PropertyBody {
    Bag(Children),
    Leaf(Leaf),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Leaf {
    pub(crate) value: Option<Value>,
    pub(crate) default: Option<Value>,
    pub(crate) provider: Option<Box<dyn ValueProvider>>,
}

impl Scheme {
    pub(crate) fn property_node(&self, id: NodeId) -> Option<&PropertyNode> {
        match &self.data(id).kind {
            NodeKind::Property(prop) => Some(prop),
            _ => None,
        }
    }

    fn property_node_mut(&mut self, id: NodeId) -> Option<&mut PropertyNode> {
        match &mut self.data_mut(id).kind {
            NodeKind::Property(prop) => Some(prop),
            _ => None,
        }
    }

    fn leaf(&self, id: NodeId) -> Option<&Leaf> {
        match self.property_node(id) {
            Some(PropertyNode {
                body: PropertyBody::Leaf(leaf),
                ..
            }) => Some(leaf),
            _ => None,
        }
    }

    fn leaf_mut(&mut self, id: NodeId) -> Result<&mut Leaf> {
        if self.leaf(id).is_none() {
            return Err(self.not_a_leaf(id));
        }
        match self.property_node_mut(id) {
            Some(PropertyNode {
                body: PropertyBody::Leaf(leaf),
                ..
            }) => Ok(leaf),
            _ => Err(SchemeError::InvalidNode(format!("Node {id} is not a leaf property."))),
        }
    }

    fn not_a_leaf(&self, id: NodeId) -> SchemeError {
        let path = self.path(id);
        match self.property_node(id) {
            Some(prop) if prop.is_bag() => {
                SchemeError::InvalidNode(format!("Cannot set value of bag property '{path}'."))
            }
            _ => SchemeError::InvalidNode(format!("Node '{path}' is not a property.")),
        }
    }

    /// Check for a property with children
    #[must_use]
    pub fn is_bag(&self, id: NodeId) -> bool {
        self.property_node(id).is_some_and(PropertyNode::is_bag)
    }

    /// Check for a leaf property
    #[must_use]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.leaf(id).is_some()
    }

    /// Check for the unique key marker
    #[must_use]
    pub fn is_unique_key(&self, id: NodeId) -> bool {
        self.property_node(id).is_some_and(|prop| prop.unique_key)
    }

    /// Effective value: own value, then provider value, then default
    ///
    /// Always `None` for bags and non-property nodes.
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<Value> {
        let leaf = self.leaf(id)?;
        leaf.value
            .clone()
            .or_else(|| leaf.provider.as_ref().and_then(|p| p.value()))
            .or_else(|| leaf.default.clone())
    }

    /// Value stored by the last `set_value`
    #[must_use]
    pub fn raw_value(&self, id: NodeId) -> Option<&Value> {
        self.leaf(id)?.value.as_ref()
    }

    /// Declared default value
    #[must_use]
    pub fn default_value(&self, id: NodeId) -> Option<&Value> {
        self.leaf(id)?.default.as_ref()
    }

    /// Store a value through the property's provider
    ///
    /// # Errors
    /// - [`SchemeError::InvalidNode`] for bags and non-property nodes
    /// - [`SchemeError::InvalidValue`] when the provider rejects the value
    pub fn set_value(&mut self, id: NodeId, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let handle = self.handle(id);
        let leaf = self.leaf_mut(id)?;
        let stored = match leaf.provider.as_mut() {
            Some(provider) => {
                if let Some(handle) = handle {
                    provider.set_property(handle);
                }
                provider.set_value(value)?
            }
            None => value,
        };
        leaf.value = non_null(stored);
        Ok(())
    }

    /// Forget the stored value, returning the leaf to its undetermined state
    ///
    /// # Errors
    /// Returns [`SchemeError::InvalidNode`] for bags and non-property nodes
    pub fn clear_value(&mut self, id: NodeId) -> Result<()> {
        let leaf = self.leaf_mut(id)?;
        leaf.value = None;
        if let Some(provider) = leaf.provider.as_mut() {
            provider.reset();
        }
        Ok(())
    }

    /// Replace the default value
    ///
    /// # Errors
    /// Returns [`SchemeError::InvalidNode`] for bags and non-property nodes
    pub fn set_default_value(&mut self, id: NodeId, value: impl Into<Value>) -> Result<()> {
        self.leaf_mut(id)?.default = non_null(value.into());
        Ok(())
    }

    /// Replace the value provider
    ///
    /// # Errors
    /// Returns [`SchemeError::InvalidNode`] for bags and non-property nodes
    pub fn set_provider(&mut self, id: NodeId, provider: Box<dyn ValueProvider>) -> Result<()> {
        self.leaf_mut(id)?.provider = Some(provider);
        self.bind_provider(id);
        Ok(())
    }

    /// Value provider of a leaf
    #[must_use]
    pub fn provider(&self, id: NodeId) -> Option<&dyn ValueProvider> {
        self.leaf(id)?.provider.as_deref()
    }

    /// Choices of a property backed by a many-values provider
    #[must_use]
    pub fn optional_values(&self, id: NodeId) -> IndexMap<String, Value> {
        self.provider(id)
            .and_then(ValueProvider::as_many_values)
            .map(|provider| provider.values())
            .unwrap_or_default()
    }

    pub(crate) fn handle(&self, id: NodeId) -> Option<PropertyHandle> {
        let prop = self.property_node(id)?;
        Some(PropertyHandle {
            id,
            name: prop.name.clone(),
            path: self.path(id),
        })
    }

    /// Point the provider of a leaf at its current position
    pub(crate) fn bind_provider(&mut self, id: NodeId) {
        let Some(handle) = self.handle(id) else {
            return;
        };
        if let Ok(leaf) = self.leaf_mut(id) {
            if let Some(provider) = leaf.provider.as_mut() {
                provider.set_property(handle);
            }
        }
    }

    /// Register conditional siblings shown while the property holds `trigger`
    ///
    /// The payload is a group or a single named node. Its members appear as
    /// peers of the property, not as its children.
    ///
    /// # Errors
    /// - [`SchemeError::InvalidNode`] for bags, non-properties and anonymous payloads
    /// - [`SchemeError::InvalidValue`] for non-scalar triggers
    /// - [`SchemeError::AlreadyDefined`] when `trigger` is already registered
    pub fn on(&mut self, id: NodeId, trigger: impl Into<Value>, payload: impl Into<Decl>) -> Result<()> {
        let trigger = trigger.into();
        let payload = payload.into();

        match self.property_node(id) {
            Some(prop) if !prop.is_bag() => {}
            Some(_) => {
                return Err(SchemeError::InvalidNode(format!(
                    "Conditional siblings cannot be attached to bag property '{}'.",
                    self.path(id)
                )))
            }
            None => {
                return Err(SchemeError::InvalidNode(format!(
                    "Node '{}' is not a property.",
                    self.path(id)
                )))
            }
        }

        let Some(key) = conditional_key(&trigger) else {
            return Err(SchemeError::InvalidValue(format!(
                "Conditional value must be scalar, {} given.",
                type_name(&trigger)
            )));
        };

        let exists = self
            .property_node(id)
            .is_some_and(|prop| prop.conditions.contains_key(&key));
        if exists {
            let what = if matches!(payload, Decl::Group(_)) {
                "siblings"
            } else {
                "sibling"
            };
            return Err(SchemeError::AlreadyDefined(format!(
                "Conditional {what} for value {} already defined.",
                export_value(&trigger)
            )));
        }

        let payload_id = if matches!(payload, Decl::Group(_)) {
            self.load(payload, Some(id))?
        } else {
            let parent = self.parent(id);
            self.load_named(payload, parent)?
        };

        if let Some(prop) = self.property_node_mut(id) {
            prop.conditions.insert(key, payload_id);
        }
        Ok(())
    }

    /// Check for any conditional registration
    #[must_use]
    pub fn has_conditional_siblings(&self, id: NodeId) -> bool {
        self.property_node(id)
            .is_some_and(|prop| !prop.conditions.is_empty())
    }

    /// Every registration, trigger key to payload, regardless of the value
    #[must_use]
    pub fn conditional_siblings(&self, id: NodeId) -> IndexMap<String, NodeId> {
        self.property_node(id)
            .map(|prop| prop.conditions.clone())
            .unwrap_or_default()
    }

    /// Siblings registered for the current value
    ///
    /// # Errors
    /// - [`SchemeError::UndeterminedProperty`] when conditions exist but the
    ///   property has no value
    /// - [`SchemeError::InvalidNode`] for non-property nodes
    pub fn siblings(&self, id: NodeId) -> Result<Vec<NodeId>> {
        if self.property_node(id).is_none() {
            return Err(SchemeError::InvalidNode(format!(
                "Node '{}' is not a property.",
                self.path(id)
            )));
        }
        self.determined_siblings(id)
            .ok_or_else(|| self.undetermined(id))
    }

    /// Sibling with the given name
    ///
    /// # Errors
    /// Same as [`Scheme::siblings`]
    pub fn sibling(&self, id: NodeId, name: &str) -> Result<Option<NodeId>> {
        Ok(self
            .siblings(id)?
            .into_iter()
            .find(|&s| self.name(s) == Some(name)))
    }

    /// `None` when the property has conditions but no value yet
    pub(crate) fn determined_siblings(&self, id: NodeId) -> Option<Vec<NodeId>> {
        let Some(prop) = self.property_node(id) else {
            return Some(Vec::new());
        };
        if prop.conditions.is_empty() {
            return Some(Vec::new());
        }
        let value = self.value(id)?;
        let payload = conditional_key(&value).and_then(|key| prop.conditions.get(&key).copied());

        Some(match payload {
            Some(payload) => match &self.data(payload).kind {
                NodeKind::Group(members) => members.clone(),
                _ => vec![payload],
            },
            None => Vec::new(),
        })
    }

    pub(crate) fn undetermined(&self, id: NodeId) -> SchemeError {
        SchemeError::UndeterminedProperty(format!(
            "Cannot get conditional siblings, optional value of property '{}' is not specified.",
            self.name(id).unwrap_or_default()
        ))
    }

    /// Options holding the item this property belongs to
    #[must_use]
    pub fn is_in_options(&self, id: NodeId) -> Option<NodeId> {
        self.property_node(id)?;
        let wrapper = self.parent(id)?;
        let options = self.parent(wrapper)?;
        (self.node_type(options) == NodeType::Options).then_some(options)
    }
}
