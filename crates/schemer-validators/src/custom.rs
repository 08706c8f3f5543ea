//! Inputs checked by a caller-supplied predicate

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use serde_json::Value;

use schemer::Input;

/// Predicate deciding validity of a [`CustomInput`]
pub type Check = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Input valid when its predicate holds
///
/// String values are trimmed. Without a predicate every value is valid.
#[derive(Clone)]
pub struct CustomInput {
    value: Value,
    name: Option<String>,
    key: Option<String>,
    check: Option<Check>,
}

impl Debug for CustomInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomInput")
            .field("value", &self.value)
            .field("name", &self.name)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl CustomInput {
    /// Wrap a value
    #[must_use]
    pub fn new(value: Value, name: Option<String>) -> Self {
        let value = match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        };
        Self {
            value,
            name: name.filter(|n| !n.is_empty()),
            key: None,
            check: None,
        }
    }

    /// Builder: validity predicate
    #[must_use]
    pub fn validate(mut self, check: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.check = Some(Arc::new(check));
        self
    }

    /// Builder: shared validity predicate
    #[must_use]
    pub fn with_check(mut self, check: Check) -> Self {
        self.check = Some(check);
        self
    }

    /// Builder: collect the value under an explicit key
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl Input for CustomInput {
    fn is_valid(&self) -> bool {
        self.check.as_ref().map_or(true, |check| check(&self.value))
    }

    fn is_undefined(&self) -> bool {
        false
    }

    fn is_nullable(&self) -> bool {
        true
    }

    fn is_null(&self) -> bool {
        self.value.is_null()
    }

    fn is_empty(&self) -> bool {
        match &self.value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    fn value(&self, _unmodified: bool) -> Value {
        if self.is_empty() {
            Value::Null
        } else {
            self.value.clone()
        }
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn issue(&self) -> Option<String> {
        if self.is_valid() {
            return None;
        }
        let shown = match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Some(format!("value ('{shown}') is not valid"))
    }
}
