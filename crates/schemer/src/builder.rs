//! Declarations and the loader that turns them into tree nodes
//!
//! A [`Decl`] is a plain description of a subtree. It can be cloned and
//! reused; attaching it to a [`Scheme`] allocates fresh nodes every time.
//!
//! ```
//! use schemer::{bag, candidates, property, Scheme};
//!
//! let scheme = Scheme::new(bag([
//!     property("title").into(),
//!     candidates("draws", [bag([
//!         property("prizeId").unique_key(),
//!         property("mechanics").choices(["random", "nth"]).default("random"),
//!     ])]),
//! ]))
//! .unwrap();
//! assert_eq!(scheme.visible_children(scheme.root()).len(), 2);
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::error::{Result, SchemeError};
use crate::input::Validator;
use crate::node::{Children, NodeData, NodeId, NodeKind};
use crate::options::OptionsNode;
use crate::property::{Leaf, PropertyBody, PropertyNode};
use crate::provider::{ManyValuesProvider, ScalarProvider, StaticArrayProvider, UserValueProvider, ValueProvider};
use crate::scheme::Scheme;

/// Declaration of a subtree
#[derive(Debug, Clone)]
pub enum Decl {
    /// Anonymous container
    Bag(Vec<Decl>),
    /// Named leaf or bag
    Property(PropertyDecl),
    /// Named collection of items
    Options(OptionsDecl),
    /// Tuple of conditional siblings
    Group(Vec<Decl>),
}

impl Decl {
    /// Name of properties and options
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Property(prop) => Some(&prop.name),
            Self::Options(opts) => Some(&opts.name),
            Self::Bag(_) | Self::Group(_) => None,
        }
    }

    /// Kind label for messages
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bag(_) => "Bag",
            Self::Property(_) => "Property",
            Self::Options(_) => "Options",
            Self::Group(_) => "Group",
        }
    }
}

/// Declaration of a property
#[derive(Debug, Clone)]
pub struct PropertyDecl {
    name: String,
    provider: Option<Box<dyn ValueProvider>>,
    default: Option<Value>,
    children: Vec<Decl>,
    unique_key: bool,
    conditions: Vec<(Value, Decl)>,
}

impl PropertyDecl {
    /// Builder: fixed value
    #[must_use]
    pub fn value(self, value: impl Into<Value>) -> Self {
        self.provider(ScalarProvider::new(value.into()))
    }

    /// Builder: one of the listed values
    #[must_use]
    pub fn choices<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.provider(StaticArrayProvider::new(values))
    }

    /// Builder: values checked by a user input validator
    #[must_use]
    pub fn validated(self, validator: Arc<dyn Validator>) -> Self {
        self.provider(UserValueProvider::new(validator))
    }

    /// Builder: custom value provider
    #[must_use]
    pub fn provider(mut self, provider: impl ValueProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Builder: nested properties, turning this into a bag
    #[must_use]
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Decl>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Builder: mark as unique key of option candidates
    #[inline]
    #[must_use]
    pub fn unique_key(mut self) -> Self {
        self.unique_key = true;
        self
    }

    /// Builder: default value
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Builder: siblings shown while the value equals `trigger`
    #[must_use]
    pub fn on(mut self, trigger: impl Into<Value>, payload: impl Into<Decl>) -> Self {
        self.conditions.push((trigger.into(), payload.into()));
        self
    }
}

impl From<PropertyDecl> for Decl {
    fn from(prop: PropertyDecl) -> Self {
        Self::Property(prop)
    }
}

/// Declaration of options
#[derive(Debug, Clone)]
pub struct OptionsDecl {
    name: String,
    candidates: bool,
    entries: Vec<OptionEntry>,
}

impl From<OptionsDecl> for Decl {
    fn from(opts: OptionsDecl) -> Self {
        Self::Options(opts)
    }
}

/// Item or candidate of options
#[derive(Debug, Clone)]
pub enum OptionEntry {
    /// Scalar item, keyed by its serialized value unless a key is given
    Scalar {
        /// Explicit key
        key: Option<String>,
        /// Scalar value
        value: Value,
    },
    /// Subtree
    Node(Decl),
}

impl OptionEntry {
    /// Scalar entry with an explicit key
    #[must_use]
    pub fn keyed(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Scalar {
            key: Some(key.into()),
            value: value.into(),
        }
    }

    /// Entries for every value of a provider, keyed when it preserves keys
    #[must_use]
    pub fn from_provider(provider: &dyn ManyValuesProvider) -> Vec<Self> {
        let preserve = provider.preserve_keys();
        provider
            .values()
            .into_iter()
            .map(|(key, value)| Self::Scalar {
                key: preserve.then_some(key),
                value,
            })
            .collect()
    }
}

impl From<Decl> for OptionEntry {
    fn from(decl: Decl) -> Self {
        Self::Node(decl)
    }
}

impl From<PropertyDecl> for OptionEntry {
    fn from(prop: PropertyDecl) -> Self {
        Self::Node(prop.into())
    }
}

impl From<Value> for OptionEntry {
    fn from(value: Value) -> Self {
        Self::Scalar { key: None, value }
    }
}

macro_rules! scalar_entry {
    ($($ty:ty),*) => {$(
        impl From<$ty> for OptionEntry {
            fn from(value: $ty) -> Self {
                Self::Scalar { key: None, value: value.into() }
            }
        }
    )*};
}

scalar_entry!(&str, String, i64, i32, f64, bool);

/// Anonymous container
#[must_use]
pub fn bag<I>(children: I) -> Decl
where
    I: IntoIterator,
    I::Item: Into<Decl>,
{
    Decl::Bag(children.into_iter().map(Into::into).collect())
}

/// Property without value constraints
#[must_use]
pub fn property(name: impl Into<String>) -> PropertyDecl {
    PropertyDecl {
        name: name.into(),
        provider: None,
        default: None,
        children: Vec::new(),
        unique_key: false,
        conditions: Vec::new(),
    }
}

/// Options with statically declared items
#[must_use]
pub fn options<I>(name: impl Into<String>, items: I) -> Decl
where
    I: IntoIterator,
    I::Item: Into<OptionEntry>,
{
    Decl::Options(OptionsDecl {
        name: name.into(),
        candidates: false,
        entries: items.into_iter().map(Into::into).collect(),
    })
}

/// Options whose items are picked from candidates
#[must_use]
pub fn candidates<I>(name: impl Into<String>, candidates: I) -> Decl
where
    I: IntoIterator,
    I::Item: Into<OptionEntry>,
{
    Decl::Options(OptionsDecl {
        name: name.into(),
        candidates: true,
        entries: candidates.into_iter().map(Into::into).collect(),
    })
}

/// Options with the values of a provider as items
#[must_use]
pub fn options_from(name: impl Into<String>, provider: &dyn ManyValuesProvider) -> Decl {
    options(name, OptionEntry::from_provider(provider))
}

/// Options with the values of a provider as candidates
#[must_use]
pub fn candidates_from(name: impl Into<String>, provider: &dyn ManyValuesProvider) -> Decl {
    candidates(name, OptionEntry::from_provider(provider))
}

/// Conditional siblings sharing one trigger
#[must_use]
pub fn group<I>(members: I) -> Decl
where
    I: IntoIterator,
    I::Item: Into<Decl>,
{
    Decl::Group(members.into_iter().map(Into::into).collect())
}

impl Scheme {
    /// Allocate a node for `decl`; nothing is left behind on failure
    pub(crate) fn load(&mut self, decl: Decl, parent: Option<NodeId>) -> Result<NodeId> {
        let id = self.alloc(NodeData::new(parent));
        match self.load_into(id, decl) {
            Ok(()) => Ok(id),
            Err(err) => {
                self.release(id);
                Err(err)
            }
        }
    }

    /// Load a named declaration and validate options on attachment
    pub(crate) fn load_named(&mut self, decl: Decl, parent: Option<NodeId>) -> Result<NodeId> {
        if decl.name().is_none() {
            return Err(SchemeError::InvalidNode(format!(
                "Scheme node must be named (e.g. Property or Options), {} given.",
                decl.type_name()
            )));
        }
        let is_options = matches!(decl, Decl::Options(_));
        let id = self.load(decl, parent)?;
        if is_options {
            if let Err(err) = self.validate_declaration(id) {
                self.release(id);
                return Err(err);
            }
        }
        Ok(id)
    }

    fn load_into(&mut self, id: NodeId, decl: Decl) -> Result<()> {
        match decl {
            Decl::Bag(children) => {
                for child in children {
                    self.attach(id, child)?;
                }
            }
            Decl::Property(prop) => self.load_property(id, prop)?,
            Decl::Options(opts) => {
                if opts.name.is_empty() {
                    return Err(SchemeError::InvalidNode("Options name must be defined.".into()));
                }
                self.set_kind(id, NodeKind::Options(OptionsNode::new(opts.name)));
                for entry in opts.entries {
                    if opts.candidates {
                        self.add_candidate(id, entry)?;
                    } else {
                        self.add_item(id, entry)?;
                    }
                }
            }
            Decl::Group(members) => {
                self.set_kind(id, NodeKind::Group(Vec::new()));
                let member_parent = self.parent(id).and_then(|owner| self.parent(owner));
                for member in members {
                    let member = self.load_named(member, member_parent)?;
                    if let NodeKind::Group(loaded) = &mut self.data_mut(id).kind {
                        loaded.push(member);
                    }
                }
            }
        }
        Ok(())
    }

    fn load_property(&mut self, id: NodeId, prop: PropertyDecl) -> Result<()> {
        if prop.name.is_empty() {
            return Err(SchemeError::InvalidNode("Property name must be defined.".into()));
        }
        let is_bag = !prop.children.is_empty();
        if is_bag && prop.provider.is_some() {
            return Err(SchemeError::InvalidNode(format!(
                "Property '{}' cannot have both children and a value provider.",
                prop.name
            )));
        }

        let body = if is_bag {
            PropertyBody::Bag(Children::new())
        } else {
            PropertyBody::Leaf(Leaf {
                value: None,
                default: prop.default.filter(|d| !d.is_null()),
                provider: prop.provider,
            })
        };
        self.set_kind(
            id,
            NodeKind::Property(PropertyNode {
                name: prop.name,
                body,
                unique_key: prop.unique_key,
                conditions: Default::default(),
            }),
        );

        for child in prop.children {
            self.attach(id, child)?;
        }
        self.bind_provider(id);
        for (trigger, payload) in prop.conditions {
            self.on(id, trigger, payload)?;
        }
        Ok(())
    }
}
