//! Scalar items of primitive options

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, SchemeError};
use crate::value::{is_scalar, serialize_value};

/// Immutable (key, scalar value) pair
///
/// The key defaults to the serialized value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayItem {
    key: String,
    value: Value,
}

impl ArrayItem {
    /// Create item from a scalar value and an optional key
    ///
    /// # Errors
    /// Returns [`SchemeError::InvalidValue`] for non-scalar values, or when
    /// both key and value are empty
    pub fn new(value: Value, key: Option<String>) -> Result<Self> {
        if !value.is_null() && !is_scalar(&value) {
            return Err(SchemeError::InvalidValue(format!(
                "Array value must be of scalar type, {} given.",
                type_name(&value)
            )));
        }

        let value = match value {
            Value::String(s) if s.is_empty() => Value::Null,
            other => other,
        };
        let key = key
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| serialize_value(&value));

        if key.is_empty() {
            return Err(SchemeError::InvalidValue(
                "Non-associative array item with empty value is not allowed.".into(),
            ));
        }

        Ok(Self { key, value })
    }

    /// Item key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Item value
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Name of a JSON value type for messages
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
