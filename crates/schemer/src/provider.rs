//! Value providers: how a leaf property obtains and validates its value
//!
//! Three strategies ship with the crate:
//! - [`ScalarProvider`] holds a static value
//! - [`StaticArrayProvider`] accepts one of a static set of choices
//! - [`UserValueProvider`] delegates to a user input [`Validator`]
//!
//! Providers are owned by their property and copied together with it when a
//! candidate template is picked.

use std::fmt::Debug;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Result, SchemeError};
use crate::input::{validate_single, Validator};
use crate::node::NodeId;
use crate::value::{export_value, sanitize_value, serialize_value};

/// Back-reference from a provider to its property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyHandle {
    /// Property node
    pub id: NodeId,
    /// Property name
    pub name: String,
    /// Path of the property at the time of binding
    pub path: String,
}

/// Broad category of a provider, used by form renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Static value
    Scalar,
    /// One (or several) of a static set
    Choice,
    /// Externally validated user input
    UserInput,
    /// Anything else
    Custom,
}

/// Strategy for storing and validating a leaf value
pub trait ValueProvider: Debug {
    /// Validate a value, returning what the property should store
    ///
    /// # Errors
    /// Returns [`SchemeError::InvalidValue`] when the value is rejected
    fn set_value(&mut self, value: Value) -> Result<Value>;

    /// Value held by the provider itself
    fn value(&self) -> Option<Value> {
        None
    }

    /// Forget any held value
    fn reset(&mut self) {}

    /// Bind the provider to its property
    fn set_property(&mut self, property: PropertyHandle);

    /// Bound property
    fn property(&self) -> Option<&PropertyHandle>;

    /// Provider category
    fn kind(&self) -> ProviderKind;

    /// Deep copy behind a box
    fn clone_box(&self) -> Box<dyn ValueProvider>;

    /// View as a provider of enumerable values
    fn as_many_values(&self) -> Option<&dyn ManyValuesProvider> {
        None
    }

    /// Validator behind a user input provider
    fn validator(&self) -> Option<&Arc<dyn Validator>> {
        None
    }

    /// Human readable rendering of the current value
    fn human_value(&self) -> Option<String> {
        None
    }
}

impl Clone for Box<dyn ValueProvider> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Provider exposing the full set of acceptable values
pub trait ManyValuesProvider: ValueProvider {
    /// Acceptable values keyed by label
    fn values(&self) -> IndexMap<String, Value>;

    /// Labels (not values) are what gets submitted
    fn preserve_keys(&self) -> bool;

    /// Several values may be selected at once
    fn multiple_values(&self) -> bool;
}

/// Provider holding a static value
#[derive(Debug, Clone, Default)]
pub struct ScalarProvider {
    value: Option<Value>,
    property: Option<PropertyHandle>,
}

impl ScalarProvider {
    /// Create provider with an initial value
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            value: (!value.is_null()).then_some(value),
            property: None,
        }
    }
}

impl ValueProvider for ScalarProvider {
    fn set_value(&mut self, value: Value) -> Result<Value> {
        self.value = (!value.is_null()).then(|| value.clone());
        Ok(value)
    }

    fn value(&self) -> Option<Value> {
        self.value.clone()
    }

    fn reset(&mut self) {
        self.value = None;
    }

    fn set_property(&mut self, property: PropertyHandle) {
        self.property = Some(property);
    }

    fn property(&self) -> Option<&PropertyHandle> {
        self.property.as_ref()
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Scalar
    }

    fn clone_box(&self) -> Box<dyn ValueProvider> {
        Box::new(self.clone())
    }
}

/// Provider accepting one of a static set of values
#[derive(Debug, Clone)]
pub struct StaticArrayProvider {
    values: IndexMap<String, Value>,
    multiple: bool,
    property: Option<PropertyHandle>,
}

impl StaticArrayProvider {
    /// Create provider from a list; each value is its own label
    #[must_use]
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values
            .into_iter()
            .map(|v| {
                let v = v.into();
                (serialize_value(&v), v)
            })
            .collect();
        Self {
            values,
            multiple: false,
            property: None,
        }
    }

    /// Create provider from labelled values
    #[must_use]
    pub fn keyed<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            multiple: false,
            property: None,
        }
    }

    /// Builder: accept arrays of choices
    #[inline]
    #[must_use]
    pub fn with_multiple_values(mut self) -> Self {
        self.multiple = true;
        self
    }

    fn contains(&self, value: &Value) -> bool {
        self.values.values().any(|v| v == value)
    }

    fn accepts(&self, value: &Value) -> bool {
        match value {
            Value::Array(items) if self.multiple => items.iter().all(|item| self.contains(item)),
            other => self.contains(other),
        }
    }
}

impl ValueProvider for StaticArrayProvider {
    fn set_value(&mut self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(value);
        }
        let value = sanitize_value(value);
        if !self.accepts(&value) {
            let property = self
                .property
                .as_ref()
                .map(|p| format!(" for property '{}'", p.name))
                .unwrap_or_default();
            let choices: Vec<_> = self.values.values().cloned().collect();
            return Err(SchemeError::InvalidValue(format!(
                "Value {}{} does not match optional values [ {} ].",
                export_value(&value),
                property,
                export_value(&Value::Array(choices)),
            )));
        }
        Ok(value)
    }

    fn set_property(&mut self, property: PropertyHandle) {
        self.property = Some(property);
    }

    fn property(&self) -> Option<&PropertyHandle> {
        self.property.as_ref()
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Choice
    }

    fn clone_box(&self) -> Box<dyn ValueProvider> {
        Box::new(self.clone())
    }

    fn as_many_values(&self) -> Option<&dyn ManyValuesProvider> {
        Some(self)
    }
}

impl ManyValuesProvider for StaticArrayProvider {
    fn values(&self) -> IndexMap<String, Value> {
        self.values.clone()
    }

    fn preserve_keys(&self) -> bool {
        false
    }

    fn multiple_values(&self) -> bool {
        self.multiple
    }
}

/// Provider validating values with a user input [`Validator`]
#[derive(Debug, Clone)]
pub struct UserValueProvider {
    validator: Arc<dyn Validator>,
    property: Option<PropertyHandle>,
}

impl UserValueProvider {
    /// Create provider for a validator
    #[must_use]
    pub fn new(validator: Arc<dyn Validator>) -> Self {
        Self {
            validator,
            property: None,
        }
    }
}

impl ValueProvider for UserValueProvider {
    fn set_value(&mut self, value: Value) -> Result<Value> {
        let name = self.property.as_ref().map(|p| format!("'{}'", p.path));
        let input = self.validator.input(value, name);
        validate_single(input.as_ref()).map_err(SchemeError::InvalidValue)
    }

    fn set_property(&mut self, property: PropertyHandle) {
        self.property = Some(property);
    }

    fn property(&self) -> Option<&PropertyHandle> {
        self.property.as_ref()
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::UserInput
    }

    fn clone_box(&self) -> Box<dyn ValueProvider> {
        Box::new(self.clone())
    }

    fn validator(&self) -> Option<&Arc<dyn Validator>> {
        Some(&self.validator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Input;
    use serde_json::json;

    #[derive(Debug)]
    struct PositiveInput {
        value: Value,
        name: Option<String>,
    }

    impl Input for PositiveInput {
        fn is_valid(&self) -> bool {
            self.value.as_i64().is_some_and(|n| n > 0)
        }
        fn is_undefined(&self) -> bool {
            false
        }
        fn is_nullable(&self) -> bool {
            false
        }
        fn is_null(&self) -> bool {
            self.value.is_null()
        }
        fn is_empty(&self) -> bool {
            self.value.is_null()
        }
        fn value(&self, _unmodified: bool) -> Value {
            self.value.clone()
        }
        fn name(&self) -> Option<&str> {
            self.name.as_deref()
        }
        fn key(&self) -> Option<&str> {
            None
        }
        fn issue(&self) -> Option<String> {
            Some("must be a positive number".into())
        }
    }

    #[derive(Debug)]
    struct Positive;

    impl Validator for Positive {
        fn name(&self) -> &str {
            "positive"
        }
        fn input(&self, value: Value, name: Option<String>) -> Box<dyn Input> {
            Box::new(PositiveInput { value, name })
        }
    }

    fn handle(name: &str, path: &str) -> PropertyHandle {
        PropertyHandle {
            id: NodeId::new(0),
            name: name.into(),
            path: path.into(),
        }
    }

    #[test]
    fn scalar_provider_keeps_value() {
        let mut provider = ScalarProvider::new(json!(5));
        assert_eq!(provider.value(), Some(json!(5)));
        assert_eq!(provider.set_value(json!(7)).unwrap(), json!(7));
        assert_eq!(provider.value(), Some(json!(7)));
        provider.reset();
        assert_eq!(provider.value(), None);
    }

    #[test]
    fn static_array_accepts_members() {
        let mut provider = StaticArrayProvider::new(["random", "nth"]);
        assert_eq!(provider.set_value(json!("nth")).unwrap(), json!("nth"));
        assert_eq!(provider.set_value(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn static_array_sanitizes_before_check() {
        let mut provider = StaticArrayProvider::new([1, 2, 3]);
        assert_eq!(provider.set_value(json!("2")).unwrap(), json!(2));
    }

    #[test]
    fn static_array_rejects_strangers() {
        let mut provider = StaticArrayProvider::new(["random", "nth"]);
        provider.set_property(handle("mechanics", "draws.mechanics"));
        let err = provider.set_value(json!("first")).unwrap_err();
        assert_eq!(
            err,
            SchemeError::InvalidValue(
                "Value 'first' for property 'mechanics' does not match optional values [ 'random', 'nth' ]."
                    .into()
            )
        );
    }

    #[test]
    fn static_array_multiple_values() {
        let mut single = StaticArrayProvider::new(["a", "b"]);
        assert!(single.set_value(json!(["a", "b"])).is_err());

        let mut multi = StaticArrayProvider::new(["a", "b"]).with_multiple_values();
        assert_eq!(multi.set_value(json!(["a", "b"])).unwrap(), json!(["a", "b"]));
        assert!(multi.set_value(json!(["a", "c"])).is_err());
        assert!(multi.multiple_values());
    }

    #[test]
    fn static_array_keyed_values() {
        let provider = StaticArrayProvider::keyed([("First", 1), ("Second", 2)]);
        let values = provider.values();
        assert_eq!(values.get("First"), Some(&json!(1)));
        assert!(!provider.preserve_keys());
    }

    #[test]
    fn user_value_provider_maps_issue() {
        let mut provider = UserValueProvider::new(Arc::new(Positive));
        provider.set_property(handle("limit", "draws.limit"));
        assert_eq!(provider.set_value(json!(3)).unwrap(), json!(3));
        let err = provider.set_value(json!(-3)).unwrap_err();
        assert_eq!(
            err,
            SchemeError::InvalidValue("'draws.limit' must be a positive number.".into())
        );
    }

    #[test]
    fn boxed_providers_clone_independently() {
        let original: Box<dyn ValueProvider> = Box::new(ScalarProvider::new(json!(1)));
        let mut copy = original.clone();
        copy.set_value(json!(2)).unwrap();
        assert_eq!(original.value(), Some(json!(1)));
        assert_eq!(copy.value(), Some(json!(2)));
    }

    #[test]
    fn kinds() {
        assert_eq!(ScalarProvider::default().kind(), ProviderKind::Scalar);
        assert_eq!(StaticArrayProvider::new(["a"]).kind(), ProviderKind::Choice);
        assert!(StaticArrayProvider::new(["a"]).as_many_values().is_some());
        assert!(UserValueProvider::new(Arc::new(Positive)).validator().is_some());
    }
}
