//! Renderer-neutral description of one form field

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use schemer::value::serialize_value;
use schemer::{NodeId, ProviderKind, Scheme};

use crate::error::{FormError, Result};
use crate::transform::{input_name, HumanReadableSlug};

/// Kind of control a field is rendered as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// One of a set
    Select,
    /// Several of a set
    #[serde(rename = "multiselect")]
    MultiSelect,
    /// On/off
    Switch,
    /// Single line of text
    Text,
    /// Multi-line text
    #[serde(rename = "longtext")]
    LongText,
}

/// Field derived from a scheme leaf
///
/// All data are captured when the field is built. Rebuild the form after
/// changing the scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    node: NodeId,
    input_type: InputType,
    required: bool,
    disabled: bool,
    hidden: bool,
    path: String,
    name: String,
    input_name: String,
    group: Option<String>,
    label: String,
    options: IndexMap<String, String>,
    value: Value,
    human_value: String,
    validator: Option<String>,
    unique_key: bool,
    conditional: bool,
    options_path: Option<String>,
    unique_key_field: Option<NodeId>,
}

impl FieldSpec {
    /// Describe the leaf `id`
    ///
    /// # Errors
    /// Returns [`FormError::UnsupportedProperty`] for leaves without a choice
    /// or user input provider.
    pub fn new(scheme: &Scheme, id: NodeId, prefix: &str, slug: &dyn HumanReadableSlug) -> Result<Self> {
        let path = scheme.path(id);
        let name = scheme.name(id).unwrap_or_default().to_string();
        let provider = scheme.provider(id);
        let choices = scheme.optional_values(id);

        let input_type = match provider {
            Some(p) if p.as_many_values().is_some() || !choices.is_empty() => {
                if p.as_many_values().is_some_and(|many| many.multiple_values()) {
                    InputType::MultiSelect
                } else {
                    InputType::Select
                }
            }
            Some(p) if p.kind() == ProviderKind::UserInput => {
                if p.validator().is_some_and(|v| v.is_switch()) {
                    InputType::Switch
                } else {
                    InputType::Text
                }
            }
            _ => {
                return Err(FormError::UnsupportedProperty(format!(
                    "Choices or user input expected for '{path}'."
                )))
            }
        };

        let unique_key = scheme.is_unique_key(id);
        let conditional = scheme.has_conditional_siblings(id);
        let options = scheme.is_in_options(id);
        let in_options = options.is_some();
        let selectable = matches!(input_type, InputType::Select | InputType::MultiSelect);

        let required = match input_type {
            InputType::Switch => false,
            InputType::Select | InputType::MultiSelect => unique_key || conditional,
            InputType::Text | InputType::LongText => provider.is_some_and(|p| {
                let mut probe = p.clone_box();
                probe.set_value(Value::Null).is_err()
            }),
        };

        let preserve_keys = provider
            .and_then(|p| p.as_many_values())
            .is_some_and(|many| many.preserve_keys());
        let options_map = if selectable {
            choices
                .iter()
                .map(|(key, value)| {
                    let v = if preserve_keys { key.clone() } else { serialize_value(value) };
                    let key = if in_options { format!("{name}={v}") } else { v };
                    let title = slug.transform(&format!("{name}:{}", serialize_value(value)));
                    (key, title)
                })
                .collect()
        } else {
            IndexMap::new()
        };

        let current = scheme.value(id).unwrap_or(Value::Null);
        let value = if in_options && selectable {
            encode_in_options(&name, &current)
        } else {
            current.clone()
        };

        let human_value = provider
            .filter(|p| p.kind() == ProviderKind::UserInput)
            .and_then(|p| p.human_value())
            .unwrap_or_else(|| slug.transform(&format!("{name}:{}", serialize_value(&current))));

        Ok(Self {
            node: id,
            input_type,
            required,
            disabled: false,
            hidden: false,
            input_name: input_name(prefix, &path),
            label: slug.transform(&name),
            group: scheme.any_key(id).map(str::to_string),
            options: options_map,
            value,
            human_value,
            validator: provider.and_then(|p| p.validator()).map(|v| v.name().to_string()),
            unique_key,
            conditional,
            options_path: options.map(|o| scheme.path(o)),
            unique_key_field: None,
            path,
            name,
        })
    }

    /// Builder: property holding the unique key of the same candidate
    #[must_use]
    pub fn with_unique_key_field(mut self, field: Option<NodeId>) -> Self {
        self.unique_key_field = field.filter(|&f| f != self.node);
        self
    }

    /// Builder: render with another control type
    #[must_use]
    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Mark the field as required
    pub fn set_as_required(&mut self) -> &mut Self {
        self.required = true;
        self
    }

    /// Mark the field as disabled
    pub fn set_as_disabled(&mut self) -> &mut Self {
        self.disabled = true;
        self
    }

    /// Mark the field as hidden
    pub fn set_as_hidden(&mut self) -> &mut Self {
        self.hidden = true;
        self
    }

    /// Described leaf
    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Control type
    #[inline]
    #[must_use]
    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    /// Value must be supplied
    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Field is read only
    #[inline]
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Field is not shown
    #[inline]
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Scheme path of the property
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Property name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the rendered input
    #[inline]
    #[must_use]
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Nearest item key above the property
    #[inline]
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Short stable hash of [`FieldSpec::group`]
    #[must_use]
    pub fn group_hash(&self) -> Option<String> {
        self.group.as_ref().map(|group| {
            let digest = hex::encode(Sha256::digest(group.as_bytes()));
            digest[..10].to_string()
        })
    }

    /// Label of the property name
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Choices, submitted value to label
    #[inline]
    #[must_use]
    pub fn options(&self) -> &IndexMap<String, String> {
        &self.options
    }

    /// Current value as the input should show it
    #[inline]
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Label of the current value
    #[inline]
    #[must_use]
    pub fn human_value(&self) -> &str {
        &self.human_value
    }

    /// Name of the validation rule of user inputs
    #[inline]
    #[must_use]
    pub fn validator(&self) -> Option<&str> {
        self.validator.as_deref()
    }

    /// Property is the unique key of its item
    #[inline]
    #[must_use]
    pub fn has_unique_key(&self) -> bool {
        self.unique_key
    }

    /// Value decides which siblings exist
    #[inline]
    #[must_use]
    pub fn has_conditional_siblings(&self) -> bool {
        self.conditional
    }

    /// Path of the options the property belongs to
    #[inline]
    #[must_use]
    pub fn options_path(&self) -> Option<&str> {
        self.options_path.as_deref()
    }

    /// Unique key property of the same candidate
    #[inline]
    #[must_use]
    pub fn unique_key_field(&self) -> Option<NodeId> {
        self.unique_key_field
    }

    /// Serializable record of the field
    #[must_use]
    pub fn export(&self) -> FieldRecord {
        FieldRecord {
            input_type: self.input_type,
            is_required: self.required,
            is_disabled: self.disabled,
            is_hidden: self.hidden,
            path: self.path.clone(),
            name: self.name.clone(),
            input_name: self.input_name.clone(),
            group: self.group.clone(),
            group_hash: self.group_hash(),
            label: self.label.clone(),
            options: self.options.clone(),
            value: self.value.clone(),
            human_value: self.human_value.clone(),
            validator: self.validator.clone(),
            has_unique_key: self.unique_key,
        }
    }
}

/// Exported form of a [`FieldSpec`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct FieldRecord {
    /// Control type
    #[serde(rename = "type")]
    pub input_type: InputType,
    /// Value must be supplied
    pub is_required: bool,
    /// Field is read only
    pub is_disabled: bool,
    /// Field is not shown
    pub is_hidden: bool,
    /// Scheme path
    pub path: String,
    /// Property name
    pub name: String,
    /// Name of the rendered input
    pub input_name: String,
    /// Nearest item key
    pub group: Option<String>,
    /// Short hash of the group
    pub group_hash: Option<String>,
    /// Property label
    pub label: String,
    /// Choices, submitted value to label
    pub options: IndexMap<String, String>,
    /// Current value
    pub value: Value,
    /// Label of the current value
    pub human_value: String,
    /// Validation rule name
    pub validator: Option<String>,
    /// Property is a unique key
    pub has_unique_key: bool,
}

fn encode_in_options(name: &str, value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| Value::String(format!("{name}={}", serialize_value(item))))
                .collect(),
        ),
        other => Value::String(format!("{name}={}", serialize_value(other))),
    }
}
