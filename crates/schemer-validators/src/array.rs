//! Arrays whose elements share one rule

use std::sync::Arc;

use serde_json::Value;

use schemer::{Input, Validator};

use crate::basic::type_name;

/// Input validating every element of an array with one validator
#[derive(Debug)]
pub struct ArrayOf {
    values: Option<Vec<Value>>,
    raw: Value,
    inputs: Vec<Box<dyn Input>>,
    name: Option<String>,
    key: Option<String>,
    nullable: bool,
}

impl ArrayOf {
    /// Array that must be present
    #[must_use]
    pub fn new(element: &Arc<dyn Validator>, value: Value, name: Option<String>) -> Self {
        Self::build(element, value, name, false)
    }

    /// Array that may be null
    #[must_use]
    pub fn nullable(element: &Arc<dyn Validator>, value: Value, name: Option<String>) -> Self {
        Self::build(element, value, name, true)
    }

    fn build(element: &Arc<dyn Validator>, value: Value, name: Option<String>, nullable: bool) -> Self {
        let values = value.as_array().cloned();
        let inputs = values
            .iter()
            .flatten()
            .map(|item| element.input(item.clone(), name.clone()))
            .collect();
        Self {
            values,
            raw: value,
            inputs,
            name,
            key: None,
            nullable,
        }
    }

    /// Builder: collect the value under an explicit key
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl Input for ArrayOf {
    fn is_valid(&self) -> bool {
        match &self.values {
            Some(_) => self.inputs.iter().all(|input| input.is_valid()),
            None => self.nullable && self.raw.is_null(),
        }
    }

    fn is_undefined(&self) -> bool {
        false
    }

    fn is_nullable(&self) -> bool {
        self.nullable
    }

    fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    fn is_empty(&self) -> bool {
        self.values.as_ref().map_or(true, Vec::is_empty)
    }

    fn value(&self, unmodified: bool) -> Value {
        match &self.values {
            Some(_) => Value::Array(self.inputs.iter().map(|input| input.value(unmodified)).collect()),
            None => Value::Null,
        }
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn issue(&self) -> Option<String> {
        if self.values.is_none() {
            return match &self.raw {
                Value::Null if self.nullable => None,
                Value::Null => Some("must be defined as array".to_string()),
                other => Some(format!("must be an array, {} given", type_name(other))),
            };
        }
        self.inputs.iter().enumerate().find_map(|(index, input)| {
            input
                .issue()
                .map(|issue| format!("(value at index #{index}) {issue}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{numeric, text};
    use serde_json::json;

    #[test]
    fn validates_each_element() {
        let input = ArrayOf::new(&numeric(), json!(["1", 2, "3"]), None);
        assert!(input.is_valid());
        assert_eq!(input.value(false), json!([1, 2, 3]));
    }

    #[test]
    fn reports_first_bad_index() {
        let input = ArrayOf::new(&text(), json!(["a", "", "c"]), None);
        assert!(!input.is_valid());
        assert_eq!(input.issue().as_deref(), Some("(value at index #1) must not be empty"));
    }

    #[test]
    fn null_handling() {
        let strict = ArrayOf::new(&text(), Value::Null, None);
        assert!(!strict.is_valid());
        assert_eq!(strict.issue().as_deref(), Some("must be defined as array"));

        let nullable = ArrayOf::nullable(&text(), Value::Null, None);
        assert!(nullable.is_valid());
        assert!(nullable.is_empty());
    }

    #[test]
    fn scalar_is_not_an_array() {
        let input = ArrayOf::nullable(&text(), json!("a"), None);
        assert!(!input.is_valid());
        assert_eq!(input.issue().as_deref(), Some("must be an array, string given"));
    }
}
