//! Typed inputs: text, numbers, booleans and date/time values
//!
//! Every input follows one [`Rule`]. Nullable rules accept empty values,
//! strict rules report them as issues.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use schemer::value::sanitize_value;
use schemer::Input;

use crate::strings::{to_camel_case, to_snake_case};

/// Output transformation applied by [`Input::value`]
pub type Modifier = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Validation rule of a [`BasicInput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Non-empty string
    Textual,
    /// String or nothing
    NullableTextual,
    /// Non-zero number
    Numeric,
    /// Number or nothing
    NullableNumeric,
    /// Boolean
    Boolean,
    /// Boolean or nothing
    NullableBoolean,
    /// Date and/or time
    DateTime,
    /// Date and/or time, or nothing
    NullableDateTime,
}

impl Rule {
    /// Null and empty values pass the rule
    #[must_use]
    pub fn is_nullable(self) -> bool {
        matches!(
            self,
            Self::NullableTextual | Self::NullableNumeric | Self::NullableBoolean | Self::NullableDateTime
        )
    }

    /// Rule name reported to form renderers
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Textual => "text",
            Self::NullableTextual => "nullable_text",
            Self::Numeric => "numeric",
            Self::NullableNumeric => "nullable_numeric",
            Self::Boolean => "boolean",
            Self::NullableBoolean => "nullable_boolean",
            Self::DateTime => "date_time",
            Self::NullableDateTime => "nullable_date_time",
        }
    }

    fn normalize(self, value: Value) -> Value {
        match (self, value) {
            (Self::Textual | Self::NullableTextual, Value::String(s)) => Value::String(s.trim().to_string()),
            (Self::Numeric | Self::NullableNumeric, value) => sanitize_value(value),
            (_, value) => value,
        }
    }
}

/// Input validated by a [`Rule`]
#[derive(Clone)]
pub struct BasicInput {
    rule: Rule,
    value: Value,
    name: Option<String>,
    key: Option<String>,
    undefined: bool,
    modifier: Option<Modifier>,
}

impl Debug for BasicInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicInput")
            .field("rule", &self.rule)
            .field("value", &self.value)
            .field("name", &self.name)
            .field("key", &self.key)
            .field("undefined", &self.undefined)
            .finish_non_exhaustive()
    }
}

impl BasicInput {
    /// Wrap a value
    #[must_use]
    pub fn new(rule: Rule, value: Value, name: Option<String>) -> Self {
        Self {
            rule,
            value: rule.normalize(value),
            name: name.filter(|n| !n.is_empty()),
            key: None,
            undefined: false,
            modifier: None,
        }
    }

    /// Take the value stored under `key` in submitted data
    ///
    /// The key is also tried in camelCase and snake_case. A key found in no
    /// variant makes the input undefined.
    #[must_use]
    pub fn from_data(rule: Rule, data: &Map<String, Value>, key: &str, name: Option<String>) -> Self {
        let found = [key.to_string(), to_camel_case(key), to_snake_case(key)]
            .into_iter()
            .find_map(|variant| data.get(&variant).cloned());
        let undefined = found.is_none();
        let mut input = Self::new(rule, found.unwrap_or(Value::Null), name);
        input.key = Some(key.to_string());
        input.undefined = undefined;
        input
    }

    /// Builder: collect the value under an explicit key
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into()).filter(|k: &String| !k.is_empty());
        self
    }

    /// Builder: transform the value on output
    #[must_use]
    pub fn modify(mut self, modifier: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.modifier = Some(Arc::new(modifier));
        self
    }

    /// Rule of the input
    #[inline]
    #[must_use]
    pub fn rule(&self) -> Rule {
        self.rule
    }

    fn is_supported(&self) -> bool {
        match &self.value {
            Value::Object(_) => false,
            Value::Array(items) => items.iter().all(|item| !item.is_array() && !item.is_object()),
            _ => true,
        }
    }

    fn matches_type(&self) -> bool {
        match self.rule {
            Rule::Textual | Rule::NullableTextual => self.value.is_string(),
            Rule::Numeric | Rule::NullableNumeric => self.value.is_number(),
            Rule::Boolean | Rule::NullableBoolean => self.value.is_boolean(),
            Rule::DateTime | Rule::NullableDateTime => parse_date_time(&self.value),
        }
    }

    fn type_issue(&self) -> String {
        match self.rule {
            Rule::Textual | Rule::NullableTextual => {
                format!("must be a string, {} given", type_name(&self.value))
            }
            Rule::Numeric | Rule::NullableNumeric => {
                format!("must be numeric, {} given", type_name(&self.value))
            }
            Rule::Boolean | Rule::NullableBoolean => {
                format!("must be boolean, {} given", type_name(&self.value))
            }
            Rule::DateTime | Rule::NullableDateTime => {
                let given = match &self.value {
                    Value::String(s) => format!("'{s}'"),
                    Value::Number(n) => n.to_string(),
                    other => type_name(other).to_string(),
                };
                format!("must represent date and/or time, {given} given")
            }
        }
    }

    fn empty_issue(&self) -> &'static str {
        match self.rule {
            Rule::Numeric | Rule::NullableNumeric => "must not be zero",
            Rule::Boolean | Rule::NullableBoolean => "must not be null",
            _ => "must not be empty",
        }
    }
}

impl Input for BasicInput {
    fn is_valid(&self) -> bool {
        if !self.is_supported() {
            return false;
        }
        if self.rule.is_nullable() {
            self.is_empty() || self.matches_type()
        } else {
            !self.undefined && !self.is_empty() && self.matches_type()
        }
    }

    fn is_undefined(&self) -> bool {
        self.undefined
    }

    fn is_nullable(&self) -> bool {
        self.rule.is_nullable()
    }

    fn is_null(&self) -> bool {
        self.value.is_null()
    }

    fn is_empty(&self) -> bool {
        match (&self.value, self.rule) {
            (Value::Null, _) => true,
            (Value::String(s), Rule::Textual | Rule::NullableTextual | Rule::DateTime | Rule::NullableDateTime) => {
                s.is_empty()
            }
            (Value::Number(n), Rule::Numeric | Rule::NullableNumeric) => n.as_f64() == Some(0.0),
            _ => false,
        }
    }

    fn value(&self, unmodified: bool) -> Value {
        let value = match (&self.modifier, unmodified) {
            (Some(modifier), false) => modifier(self.value.clone()),
            _ => self.value.clone(),
        };
        match value {
            Value::String(s) if s.is_empty() => Value::Null,
            other => other,
        }
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn issue(&self) -> Option<String> {
        if !self.is_supported() {
            return Some(format!(
                "must be null, scalar or array of scalars, {} given",
                type_name(&self.value)
            ));
        }
        if self.is_valid() {
            return None;
        }
        if !self.rule.is_nullable() {
            if self.undefined {
                return Some("must be defined".to_string());
            }
            if self.is_empty() {
                return Some(self.empty_issue().to_string());
            }
        }
        Some(self.type_issue())
    }
}

/// JSON type name used in issue messages
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

fn parse_date_time(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_i64().is_some_and(|ts| DateTime::<Utc>::from_timestamp(ts, 0).is_some()),
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s).is_ok()
                || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
                || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").is_ok()
                || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
                || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        }
        _ => false,
    }
}
