//! [`Validator`] implementations plugged into scheme properties

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use serde_json::Value;

use schemer::{Input, Validator};

use crate::array::ArrayOf;
use crate::basic::{BasicInput, Rule};
use crate::custom::{Check, CustomInput};

/// Validator backed by a [`Rule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleValidator {
    rule: Rule,
}

impl RuleValidator {
    /// Validator of the given rule
    #[inline]
    #[must_use]
    pub const fn new(rule: Rule) -> Self {
        Self { rule }
    }

    /// Underlying rule
    #[inline]
    #[must_use]
    pub const fn rule(&self) -> Rule {
        self.rule
    }
}

impl Validator for RuleValidator {
    fn name(&self) -> &str {
        self.rule.name()
    }

    fn input(&self, value: Value, name: Option<String>) -> Box<dyn Input> {
        Box::new(BasicInput::new(self.rule, value, name))
    }

    fn is_switch(&self) -> bool {
        matches!(self.rule, Rule::Boolean | Rule::NullableBoolean)
    }
}

/// Validator backed by a predicate
#[derive(Clone)]
pub struct CustomValidator {
    name: String,
    check: Check,
}

impl Debug for CustomValidator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValidator").field("name", &self.name).finish_non_exhaustive()
    }
}

impl CustomValidator {
    /// Named predicate validator
    #[must_use]
    pub fn new(name: impl Into<String>, check: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }
}

impl Validator for CustomValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn input(&self, value: Value, name: Option<String>) -> Box<dyn Input> {
        Box::new(CustomInput::new(value, name).with_check(Arc::clone(&self.check)))
    }
}

/// Validator of arrays whose elements follow another validator
#[derive(Debug, Clone)]
pub struct ArrayOfValidator {
    element: Arc<dyn Validator>,
    nullable: bool,
    name: String,
}

impl ArrayOfValidator {
    /// Array validator; `nullable` arrays accept null
    #[must_use]
    pub fn new(element: Arc<dyn Validator>, nullable: bool) -> Self {
        let prefix = if nullable { "nullable_array_of" } else { "array_of" };
        let name = format!("{prefix}_{}", element.name());
        Self { element, nullable, name }
    }
}

impl Validator for ArrayOfValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn input(&self, value: Value, name: Option<String>) -> Box<dyn Input> {
        if self.nullable {
            Box::new(ArrayOf::nullable(&self.element, value, name))
        } else {
            Box::new(ArrayOf::new(&self.element, value, name))
        }
    }
}

/// Shared validator handle accepted by scheme properties
pub type SharedValidator = Arc<dyn Validator>;

/// Non-empty text
#[must_use]
pub fn text() -> SharedValidator {
    Arc::new(RuleValidator::new(Rule::Textual))
}

/// Text or nothing
#[must_use]
pub fn nullable_text() -> SharedValidator {
    Arc::new(RuleValidator::new(Rule::NullableTextual))
}

/// Non-zero number
#[must_use]
pub fn numeric() -> SharedValidator {
    Arc::new(RuleValidator::new(Rule::Numeric))
}

/// Number or nothing
#[must_use]
pub fn nullable_numeric() -> SharedValidator {
    Arc::new(RuleValidator::new(Rule::NullableNumeric))
}

/// Boolean switch
#[must_use]
pub fn boolean() -> SharedValidator {
    Arc::new(RuleValidator::new(Rule::Boolean))
}

/// Boolean or nothing
#[must_use]
pub fn nullable_boolean() -> SharedValidator {
    Arc::new(RuleValidator::new(Rule::NullableBoolean))
}

/// Date and/or time
#[must_use]
pub fn date_time() -> SharedValidator {
    Arc::new(RuleValidator::new(Rule::DateTime))
}

/// Date and/or time, or nothing
#[must_use]
pub fn nullable_date_time() -> SharedValidator {
    Arc::new(RuleValidator::new(Rule::NullableDateTime))
}

/// Predicate validator
#[must_use]
pub fn custom(name: &str, check: impl Fn(&Value) -> bool + Send + Sync + 'static) -> SharedValidator {
    Arc::new(CustomValidator::new(name, check))
}

/// Array of values following `element`
#[must_use]
pub fn array_of(element: SharedValidator) -> SharedValidator {
    Arc::new(ArrayOfValidator::new(element, false))
}

/// Array of values following `element`, or nothing
#[must_use]
pub fn nullable_array_of(element: SharedValidator) -> SharedValidator {
    Arc::new(ArrayOfValidator::new(element, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_and_switches() {
        assert_eq!(nullable_text().name(), "nullable_text");
        assert!(boolean().is_switch());
        assert!(!numeric().is_switch());
        assert_eq!(nullable_array_of(numeric()).name(), "nullable_array_of_numeric");
    }

    #[test]
    fn custom_validator_wraps_values() {
        let positive = custom("positive", |v| v.as_f64().is_some_and(|n| n > 0.0));
        assert!(positive.input(json!(2), None).is_valid());
        assert!(!positive.input(json!(-2), None).is_valid());
    }

    #[test]
    fn array_validator_checks_elements() {
        let list = array_of(text());
        assert!(list.input(json!(["a", "b"]), None).is_valid());
        assert!(!list.input(json!(["a", ""]), None).is_valid());
        assert!(!list.input(Value::Null, None).is_valid());
    }
}
