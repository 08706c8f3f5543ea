//! User input contract consumed by [`UserValueProvider`](crate::UserValueProvider)
//!
//! Concrete inputs (textual, numeric, date...) live outside of the core. The
//! core only needs to ask an input whether it is valid, what its normalized
//! value is and why it was rejected.

use std::fmt::Debug;

use serde_json::Value;

/// Single validated user input
pub trait Input: Debug {
    /// Value satisfies the input rules
    fn is_valid(&self) -> bool;

    /// No value was supplied at all
    fn is_undefined(&self) -> bool;

    /// Null is an acceptable value
    fn is_nullable(&self) -> bool;

    /// Supplied value is null
    fn is_null(&self) -> bool;

    /// Supplied value is empty (null, empty string or empty array)
    fn is_empty(&self) -> bool;

    /// Normalized value, or the raw one when `unmodified` is set
    fn value(&self, unmodified: bool) -> Value;

    /// Human readable name used in issue messages
    fn name(&self) -> Option<&str>;

    /// Key under which the value is collected
    fn key(&self) -> Option<&str>;

    /// Reason of rejection, `None` for valid inputs
    fn issue(&self) -> Option<String>;
}

/// Factory of inputs for one validation rule
///
/// A validator stands for a rule ("nullable text", "numeric"), each call to
/// [`Validator::input`] wraps one concrete value.
pub trait Validator: Debug {
    /// Rule name reported to form renderers
    fn name(&self) -> &str;

    /// Wrap a value into an input of this rule
    fn input(&self, value: Value, name: Option<String>) -> Box<dyn Input>;

    /// Rule accepts boolean switches only
    fn is_switch(&self) -> bool {
        false
    }
}

/// Fetch the value of a single input
///
/// # Errors
/// Returns the issue message (`"<Item> <issue>."`) when the input is invalid
pub fn validate_single(input: &dyn Input) -> Result<Value, String> {
    if input.is_valid() {
        return Ok(input.value(false));
    }
    Err(issue_message(input))
}

/// Render the rejection message of an input
#[must_use]
pub fn issue_message(input: &dyn Input) -> String {
    let item = match (input.name(), input.key()) {
        (Some(name), _) => name.to_string(),
        (None, Some(key)) if !key.is_empty() => format!("'{key}'"),
        _ => "item".to_string(),
    };
    let issue = input.issue().unwrap_or_else(|| "is not valid".to_string());
    first_upper(&format!("{item} {issue}."))
}

fn first_upper(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
