//! Value helpers shared by providers, options and path resolution
//!
//! Values are plain [`serde_json::Value`]s. `Null` is the undetermined state
//! of a leaf and never gets stored.

use serde_json::{Number, Value};

/// Convert form-submitted strings into typed values
///
/// Numeric strings become numbers, `"true"`/`"false"` become booleans,
/// `""` and `"null"` become null. Arrays are sanitized element-wise and
/// everything else passes through unchanged.
#[must_use]
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::String(s) => sanitize_str(s),
        other => other,
    }
}

fn sanitize_str(s: String) -> Value {
    if let Some(number) = parse_number(&s) {
        return Value::Number(number);
    }
    match s.as_str() {
        "" | "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(s),
    }
}

fn parse_number(s: &str) -> Option<Number> {
    if s.is_empty() || s.starts_with('+') {
        return None;
    }
    let is_float = s.contains(['.', 'e', 'E']);
    if !is_float {
        if let Ok(int) = s.parse::<i64>() {
            return Some(int.into());
        }
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

/// Serialize a value into the string used for item keys and lookups
///
/// Arrays are joined with `,`, null serializes as an empty string.
#[must_use]
pub fn serialize_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(serialize_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Human readable rendering used in error messages
#[must_use]
pub fn export_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => format!("'{s}'"),
        Value::Array(items) => items
            .iter()
            .map(export_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Check for a scalar (string, number or boolean)
#[inline]
#[must_use]
pub fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

/// Canonical key of a conditional trigger value
///
/// Returns `None` for null, arrays and objects.
#[must_use]
pub fn conditional_key(value: &Value) -> Option<String> {
    is_scalar(value).then(|| serialize_value(value))
}

/// Remove a leading `name=` from string values
///
/// Paths and form fields inside options encode values as `name=value`.
#[must_use]
pub fn strip_property_name(name: &str, value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| strip_property_name(name, item))
                .collect(),
        ),
        Value::String(s) => match s.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')) {
            Some(rest) => Value::String(rest.to_string()),
            None => Value::String(s),
        },
        other => other,
    }
}

/// Collapse `Null` into `None`
#[inline]
pub(crate) fn non_null(value: Value) -> Option<Value> {
    (!value.is_null()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitize_numbers() {
        assert_eq!(sanitize_value(json!("42")), json!(42));
        assert_eq!(sanitize_value(json!("-7")), json!(-7));
        assert_eq!(sanitize_value(json!("1.5")), json!(1.5));
        assert_eq!(sanitize_value(json!("1.2.3")), json!("1.2.3"));
    }

    #[test]
    fn sanitize_keywords() {
        assert_eq!(sanitize_value(json!("")), Value::Null);
        assert_eq!(sanitize_value(json!("null")), Value::Null);
        assert_eq!(sanitize_value(json!("true")), json!(true));
        assert_eq!(sanitize_value(json!("false")), json!(false));
        assert_eq!(sanitize_value(json!("random")), json!("random"));
    }

    #[test]
    fn sanitize_recurses_into_arrays() {
        assert_eq!(sanitize_value(json!(["1", "x", "true"])), json!([1, "x", true]));
    }

    #[test]
    fn sanitize_keeps_typed_values() {
        assert_eq!(sanitize_value(json!(3)), json!(3));
        assert_eq!(sanitize_value(json!(false)), json!(false));
    }

    #[test]
    fn sanitize_rejects_non_finite() {
        assert_eq!(sanitize_value(json!("inf")), json!("inf"));
        assert_eq!(sanitize_value(json!("NaN")), json!("NaN"));
    }

    #[test]
    fn serialize_joins_arrays() {
        assert_eq!(serialize_value(&json!([1, 2, 3])), "1,2,3");
        assert_eq!(serialize_value(&json!("nth")), "nth");
        assert_eq!(serialize_value(&json!(true)), "true");
        assert_eq!(serialize_value(&Value::Null), "");
    }

    #[test]
    fn export_quotes_strings() {
        assert_eq!(export_value(&json!("a")), "'a'");
        assert_eq!(export_value(&json!(["a", 1])), "'a', 1");
        assert_eq!(export_value(&Value::Null), "null");
    }

    #[test]
    fn conditional_keys() {
        assert_eq!(conditional_key(&json!("a")), Some("a".into()));
        assert_eq!(conditional_key(&json!(1)), Some("1".into()));
        assert_eq!(conditional_key(&json!(false)), Some("false".into()));
        assert_eq!(conditional_key(&json!([1])), None);
        assert_eq!(conditional_key(&Value::Null), None);
    }

    #[test]
    fn strip_name_prefix() {
        assert_eq!(strip_property_name("id", json!("id=5")), json!("5"));
        assert_eq!(strip_property_name("id", json!("idx=5")), json!("idx=5"));
        assert_eq!(strip_property_name("id", json!(["id=1", "id=2"])), json!(["1", "2"]));
        assert_eq!(strip_property_name("id", json!(5)), json!(5));
    }
}
