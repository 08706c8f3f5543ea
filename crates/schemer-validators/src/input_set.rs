//! Batch validation of several inputs into one keyed map

use indexmap::IndexMap;
use serde_json::Value;

use schemer::{issue_message, Input};

use crate::error::{InputError, Result};
use crate::strings::{first_upper, to_snake_case};

const DEFAULT_PATTERN: &str = "%item% %issue%.";

/// Ordered set of inputs fetched together
///
/// Values are collected under each input's key, or under its position when
/// the input has no key.
#[derive(Debug)]
pub struct InputSet {
    inputs: Vec<Box<dyn Input>>,
    snake_case_keys: bool,
    ignore_undefined: bool,
    pattern: String,
}

impl Default for InputSet {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSet {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            snake_case_keys: false,
            ignore_undefined: false,
            pattern: DEFAULT_PATTERN.to_string(),
        }
    }

    /// Builder: append an input
    #[must_use]
    pub fn with(mut self, input: impl Input + 'static) -> Self {
        self.push(Box::new(input));
        self
    }

    /// Append an input
    pub fn push(&mut self, input: Box<dyn Input>) {
        self.inputs.push(input);
    }

    /// Drop inputs matching `predicate`
    pub fn reject(&mut self, predicate: impl Fn(&dyn Input) -> bool) {
        self.inputs.retain(|input| !predicate(input.as_ref()));
    }

    /// Builder: collect values under snake_case keys
    #[must_use]
    pub fn snake_case_keys(mut self) -> Self {
        self.snake_case_keys = true;
        self
    }

    /// Builder: skip inputs with no submitted value
    #[must_use]
    pub fn ignore_undefined(mut self) -> Self {
        self.ignore_undefined = true;
        self
    }

    /// Builder: message pattern for invalid inputs
    ///
    /// `%item%` and `%issue%` are replaced by the input name and its issue.
    #[must_use]
    pub fn on_invalid(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Number of inputs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Set holds no inputs
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Validate every input and collect their values
    ///
    /// # Errors
    /// Returns [`InputError::InvalidUserInput`] for the first invalid input
    /// and [`InputError::AmbiguousKey`] when two inputs share a key.
    pub fn fetch(&self) -> Result<IndexMap<String, Value>> {
        let mut out = IndexMap::with_capacity(self.inputs.len());
        for (index, input) in self.inputs.iter().enumerate() {
            if self.ignore_undefined && input.is_undefined() {
                tracing::debug!("Skipping undefined input #{}", index + 1);
                continue;
            }
            let key = self.key_of(index, input.as_ref())?;
            if !input.is_valid() {
                return Err(InputError::InvalidUserInput(self.render(input.as_ref())));
            }
            if out.contains_key(&key) {
                return Err(InputError::AmbiguousKey(ambiguous(&key, index)));
            }
            out.insert(key, input.value(false));
        }
        Ok(out)
    }

    /// Like [`InputSet::fetch`] with null values left out
    ///
    /// # Errors
    /// Same as [`InputSet::fetch`]
    pub fn fetch_not_nulls(&self) -> Result<IndexMap<String, Value>> {
        let mut values = self.fetch()?;
        values.retain(|_, value| !value.is_null());
        Ok(values)
    }

    fn key_of(&self, index: usize, input: &dyn Input) -> Result<String> {
        match input.key() {
            Some(key) if self.snake_case_keys => {
                let snake = to_snake_case(key);
                let taken = self.inputs[..index]
                    .iter()
                    .filter_map(|other| other.key())
                    .any(|other| other != key && to_snake_case(other) == snake);
                if taken {
                    return Err(InputError::AmbiguousKey(ambiguous(&snake, index)));
                }
                Ok(snake)
            }
            Some(key) => Ok(key.to_string()),
            None => Ok(index.to_string()),
        }
    }

    fn render(&self, input: &dyn Input) -> String {
        if self.pattern == DEFAULT_PATTERN {
            return issue_message(input);
        }
        let item = match (input.name(), input.key()) {
            (Some(name), _) => name.to_string(),
            (None, Some(key)) => format!("'{key}'"),
            (None, None) => "item".to_string(),
        };
        let issue = input.issue().unwrap_or_else(|| "is not valid".to_string());
        first_upper(&self.pattern.replace("%item%", &item).replace("%issue%", &issue))
    }
}

fn ambiguous(key: &str, index: usize) -> String {
    format!(
        "Ambiguous key '{key}' for {} input item. Set input key explicitly with with_key().",
        ordinal(index + 1)
    )
}

fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::{BasicInput, Rule};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn data() -> serde_json::Map<String, Value> {
        json!({"title": " Hello ", "maxCount": "3", "note": ""})
            .as_object()
            .cloned()
            .unwrap_or_default()
    }

    #[test]
    fn collects_keyed_and_positional_values() {
        let set = InputSet::new()
            .with(BasicInput::from_data(Rule::Textual, &data(), "title", None))
            .with(BasicInput::new(Rule::NullableNumeric, json!("7"), None));
        let values = set.fetch().unwrap();
        assert_eq!(values.get("title"), Some(&json!("Hello")));
        assert_eq!(values.get("1"), Some(&json!(7)));
    }

    #[test]
    fn snake_case_keys_and_camel_lookup() {
        let set = InputSet::new()
            .with(BasicInput::from_data(Rule::Numeric, &data(), "max_count", None))
            .snake_case_keys();
        let values = set.fetch().unwrap();
        assert_eq!(values.get("max_count"), Some(&json!(3)));
    }

    #[test]
    fn first_invalid_input_fails_the_set() {
        let set = InputSet::new()
            .with(BasicInput::from_data(Rule::Textual, &data(), "note", None))
            .with(BasicInput::from_data(Rule::Textual, &data(), "missing", None));
        let err = set.fetch().unwrap_err();
        assert_eq!(err, InputError::InvalidUserInput("'note' must not be empty.".into()));
    }

    #[test]
    fn undefined_inputs_can_be_skipped() {
        let set = InputSet::new()
            .with(BasicInput::from_data(Rule::Textual, &data(), "missing", None))
            .ignore_undefined();
        assert!(set.fetch().unwrap().is_empty());
    }

    #[test]
    fn duplicate_keys_are_ambiguous() {
        let set = InputSet::new()
            .with(BasicInput::from_data(Rule::NullableTextual, &data(), "title", None))
            .with(BasicInput::from_data(Rule::NullableTextual, &data(), "title", None));
        let err = set.fetch().unwrap_err();
        assert_eq!(
            err.message(),
            "Ambiguous key 'title' for 2nd input item. Set input key explicitly with with_key()."
        );
    }

    #[test]
    fn custom_pattern_and_null_filtering() {
        let set = InputSet::new()
            .with(BasicInput::new(Rule::Numeric, json!("x"), Some("Limit".into())))
            .on_invalid("%item%: %issue%");
        assert_eq!(set.fetch().unwrap_err().message(), "Limit: must be numeric, string given");

        let mut set = InputSet::new()
            .with(BasicInput::from_data(Rule::NullableTextual, &data(), "note", None))
            .with(BasicInput::from_data(Rule::Textual, &data(), "title", None));
        assert_eq!(set.fetch_not_nulls().unwrap().len(), 1);
        set.reject(|input| input.key() == Some("title"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(23), "23rd");
    }
}
