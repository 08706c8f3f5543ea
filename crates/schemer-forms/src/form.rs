//! Field collection over a scheme and application of submitted values

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use schemer::value::serialize_value;
use schemer::{Entry, NodeId, NodeType, ProviderKind, Scheme};

use crate::error::{FormError, Result};
use crate::spec::{FieldSpec, InputType};
use crate::transform::{HumanReadableSlug, IdentitySlug, INPUT_PREFIX};

type Filter = Box<dyn Fn(&FieldSpec) -> bool>;

/// Seam towards a concrete form renderer
pub trait FormExtender {
    /// Single choice
    fn add_select(&mut self, spec: &FieldSpec);

    /// Multiple choices
    fn add_checkbox_list(&mut self, spec: &FieldSpec);

    /// On/off switch
    fn add_switch(&mut self, spec: &FieldSpec);

    /// Single line input
    fn add_text(&mut self, spec: &FieldSpec);

    /// Multi-line input
    fn add_text_area(&mut self, spec: &FieldSpec);

    /// Field carried but not shown
    fn add_hidden(&mut self, spec: &FieldSpec);

    /// Error reported for an input, or the whole form
    fn add_error(&mut self, message: &str, input_name: Option<&str>);
}

/// Settings for [`SchemeForm`] construction
#[derive(Clone)]
pub struct SchemeFormBuilder {
    prefix: String,
    slug: Arc<dyn HumanReadableSlug>,
}

impl Debug for SchemeFormBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeFormBuilder")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl Default for SchemeFormBuilder {
    fn default() -> Self {
        Self {
            prefix: INPUT_PREFIX.to_string(),
            slug: Arc::new(IdentitySlug),
        }
    }
}

impl SchemeFormBuilder {
    /// Builder: input name prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Builder: label translation
    #[must_use]
    pub fn with_slug(mut self, slug: impl HumanReadableSlug + 'static) -> Self {
        self.slug = Arc::new(slug);
        self
    }

    /// Collect the fields of `scheme`
    ///
    /// # Errors
    /// Returns [`FormError::UnsupportedProperty`] for candidate fields that
    /// cannot be rendered
    pub fn build(self, scheme: &Scheme) -> Result<SchemeForm> {
        let mut fields = Vec::new();
        self.dig(scheme, scheme.root(), &mut fields)?;
        tracing::debug!("Collected {} form fields", fields.len());
        Ok(SchemeForm {
            prefix: self.prefix,
            fields,
            filters: Vec::new(),
        })
    }

    fn spec(&self, scheme: &Scheme, id: NodeId) -> Result<FieldSpec> {
        FieldSpec::new(scheme, id, &self.prefix, self.slug.as_ref())
    }

    fn dig(&self, scheme: &Scheme, node: NodeId, out: &mut Vec<FieldSpec>) -> Result<()> {
        match scheme.node_type(node) {
            NodeType::Options => {
                let mut unique = None;
                for field in scheme.candidates(node, true).into_values() {
                    out.push(self.spec(scheme, field)?.with_unique_key_field(unique));
                    if scheme.is_unique_key(field) {
                        unique = Some(field);
                    }
                }
                for item in scheme.items(node).iter().filter_map(Entry::as_node) {
                    self.dig(scheme, item, out)?;
                }
            }
            NodeType::Property if scheme.is_leaf(node) => {
                let renderable = scheme
                    .provider(node)
                    .is_some_and(|p| matches!(p.kind(), ProviderKind::Choice | ProviderKind::UserInput));
                if renderable {
                    out.push(self.spec(scheme, node)?);
                }
            }
            _ => {
                for child in scheme.visible_children(node) {
                    self.dig(scheme, child, out)?;
                }
            }
        }
        Ok(())
    }
}

/// Form fields of a scheme
pub struct SchemeForm {
    prefix: String,
    fields: Vec<FieldSpec>,
    filters: Vec<Filter>,
}

impl Debug for SchemeForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeForm")
            .field("prefix", &self.prefix)
            .field("fields", &self.fields)
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl SchemeForm {
    /// Fields of `scheme` with default settings
    ///
    /// # Errors
    /// Same as [`SchemeFormBuilder::build`]
    pub fn from(scheme: &Scheme) -> Result<Self> {
        Self::builder().build(scheme)
    }

    /// Settings for a customized form
    #[must_use]
    pub fn builder() -> SchemeFormBuilder {
        SchemeFormBuilder::default()
    }

    /// Input name prefix
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Keep only fields matching `filter`; filters accumulate
    #[must_use]
    pub fn filter(mut self, filter: impl Fn(&FieldSpec) -> bool + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Keep fields of picked items
    #[must_use]
    pub fn grouped_only(self) -> Self {
        self.filter(|spec| spec.group().is_some())
    }

    /// Keep fields outside of picked items
    #[must_use]
    pub fn not_grouped_only(self) -> Self {
        self.filter(|spec| spec.group().is_none())
    }

    /// Fields passing every filter, in scheme order
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .filter(move |spec| self.filters.iter().all(|filter| filter(*spec)))
    }

    /// Fields keyed by input name
    #[must_use]
    pub fn collect(&self) -> IndexMap<&str, &FieldSpec> {
        self.fields().map(|spec| (spec.input_name(), spec)).collect()
    }

    /// Field rendered under `input_name`
    #[must_use]
    pub fn field(&self, input_name: &str) -> Option<&FieldSpec> {
        self.fields().find(|spec| spec.input_name() == input_name)
    }

    /// Mutable field rendered under `input_name`, filters ignored
    pub fn field_mut(&mut self, input_name: &str) -> Option<&mut FieldSpec> {
        self.fields.iter_mut().find(|spec| spec.input_name() == input_name)
    }

    /// Hand every field to a renderer
    pub fn extend_form(&self, extender: &mut dyn FormExtender) {
        for spec in self.fields() {
            if spec.is_hidden() {
                extender.add_hidden(spec);
                continue;
            }
            match spec.input_type() {
                InputType::Select => extender.add_select(spec),
                InputType::MultiSelect => extender.add_checkbox_list(spec),
                InputType::Switch => extender.add_switch(spec),
                InputType::Text => extender.add_text(spec),
                InputType::LongText => extender.add_text_area(spec),
            }
        }
    }

    /// Store submitted values into `scheme`
    ///
    /// Values are applied in submission order. A unique key submitted for a
    /// candidate picks a new item; later fields of the same candidate are
    /// redirected into that item. Candidate fields submitted before any
    /// item is picked are skipped.
    ///
    /// # Errors
    /// - [`FormError::UnknownInput`] for input names of no field
    /// - [`FormError::Scheme`] when the scheme rejects a value
    pub fn update_scheme(&self, scheme: &mut Scheme, submitted: &IndexMap<String, Value>) -> Result<()> {
        let fields = self.collect();
        let root = scheme.root();
        let mut picked: IndexMap<String, String> = IndexMap::new();

        for (input, value) in submitted {
            let Some(spec) = fields.get(input.as_str()) else {
                return Err(FormError::UnknownInput(format!(
                    "Scheme form input with name '{input}' not found."
                )));
            };

            let path = substitute(spec.path(), &picked);
            let value = if spec.has_unique_key() && !is_encoded(value) {
                Value::String(format!("{}={}", spec.name(), serialize_value(value)))
            } else {
                value.clone()
            };

            let target = match spec.options_path() {
                Some(options) if spec.has_unique_key() && path.contains("=*]") => substitute(options, &picked),
                _ => path,
            };
            if target.contains("=*]") {
                tracing::debug!("Skipping input '{}': no item picked for '{}'", input, target);
                continue;
            }
            tracing::trace!("Updating '{}' from input '{}'", target, input);

            let node = scheme.set(root, &target, value)?;
            if let Some((name, key)) = scheme.key(node).and_then(|key| key.split_once('=')) {
                picked.insert(name.to_string(), key.to_string());
            }
        }
        Ok(())
    }
}

fn is_encoded(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.contains('='))
}

fn substitute(path: &str, picked: &IndexMap<String, String>) -> String {
    picked.iter().fold(path.to_string(), |path, (name, key)| {
        path.replace(&format!("[{name}=*]"), &format!("[{name}={key}]"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemer::{bag, candidates, property};
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(&'static str, String)>,
    }

    impl FormExtender for Recorder {
        fn add_select(&mut self, spec: &FieldSpec) {
            self.calls.push(("select", spec.name().to_string()));
        }
        fn add_checkbox_list(&mut self, spec: &FieldSpec) {
            self.calls.push(("checkbox_list", spec.name().to_string()));
        }
        fn add_switch(&mut self, spec: &FieldSpec) {
            self.calls.push(("switch", spec.name().to_string()));
        }
        fn add_text(&mut self, spec: &FieldSpec) {
            self.calls.push(("text", spec.name().to_string()));
        }
        fn add_text_area(&mut self, spec: &FieldSpec) {
            self.calls.push(("text_area", spec.name().to_string()));
        }
        fn add_hidden(&mut self, spec: &FieldSpec) {
            self.calls.push(("hidden", spec.name().to_string()));
        }
        fn add_error(&mut self, message: &str, _input_name: Option<&str>) {
            self.calls.push(("error", message.to_string()));
        }
    }

    fn scheme() -> Scheme {
        Scheme::new(bag([
            property("kind").choices(["a", "b"]).into(),
            candidates(
                "draws",
                [bag([
                    property("prizeId").choices([1, 2, 3]).unique_key(),
                    property("mechanics").choices(["random", "nth"]).default("random"),
                ])],
            ),
        ]))
        .unwrap()
    }

    #[test]
    fn collects_fields_in_scheme_order() {
        let mut scheme = scheme();
        let root = scheme.root();
        scheme.set(root, "draws[prizeId=1].mechanics", "nth").unwrap();

        let form = SchemeForm::from(&scheme).unwrap();
        let paths: Vec<_> = form.fields().map(FieldSpec::path).collect();
        assert_eq!(
            paths,
            vec![
                "kind",
                "draws[prizeId=*].prizeId",
                "draws[prizeId=*].mechanics",
                "draws[prizeId=1].prizeId",
                "draws[prizeId=1].mechanics",
            ]
        );
        assert_eq!(form.grouped_only().fields().count(), 2);
    }

    #[test]
    fn extend_form_dispatches_by_type() {
        let mut form = SchemeForm::from(&scheme()).unwrap();
        let kind = form.fields().next().map(|s| s.input_name().to_string()).unwrap();
        form.field_mut(&kind).unwrap().set_as_hidden();

        let mut recorder = Recorder::default();
        form.extend_form(&mut recorder);
        assert_eq!(recorder.calls[0], ("hidden", "kind".to_string()));
        assert_eq!(recorder.calls[1], ("select", "prizeId".to_string()));
    }

    #[test]
    fn update_picks_then_redirects_candidate_fields() {
        let mut scheme = scheme();
        let form = SchemeForm::from(&scheme).unwrap();
        let name = |path: &str| crate::transform::input_name(form.prefix(), path);

        let mut submitted = IndexMap::new();
        submitted.insert(name("kind"), json!("b"));
        submitted.insert(name("draws[prizeId=*].prizeId"), json!(2));
        submitted.insert(name("draws[prizeId=*].mechanics"), json!("mechanics=nth"));
        form.update_scheme(&mut scheme, &submitted).unwrap();

        assert_eq!(
            scheme.export().unwrap(),
            json!({"kind": "b", "draws": [{"prizeId": 2, "mechanics": "nth"}]})
        );
    }

    #[test]
    fn candidate_fields_without_a_pick_are_skipped() {
        let mut scheme = scheme();
        let form = SchemeForm::from(&scheme).unwrap();
        let name = |path: &str| crate::transform::input_name(form.prefix(), path);

        let mut submitted = IndexMap::new();
        submitted.insert(name("draws[prizeId=*].mechanics"), json!("mechanics=nth"));
        form.update_scheme(&mut scheme, &submitted).unwrap();

        let root = scheme.root();
        let item = scheme.set(root, "draws", "prizeId=1").unwrap();
        let mechanics = scheme.get_node(item, "mechanics").unwrap();
        assert_eq!(scheme.value(mechanics), Some(json!("random")));
    }

    #[test]
    fn unknown_inputs_are_rejected() {
        let mut scheme = scheme();
        let form = SchemeForm::from(&scheme).unwrap();
        let mut submitted = IndexMap::new();
        submitted.insert("scheme__00".to_string(), json!(1));
        let err = form.update_scheme(&mut scheme, &submitted).unwrap_err();
        assert!(matches!(err, FormError::UnknownInput(_)));
    }
}
