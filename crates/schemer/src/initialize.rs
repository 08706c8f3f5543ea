//! Bulk initialization from exported JSON

use serde_json::{Map, Value};

use crate::array_item::type_name;
use crate::error::{Result, SchemeError};
use crate::node::{NodeId, NodeType};
use crate::options::Entry;
use crate::scheme::Scheme;
use crate::value::serialize_value;

impl Scheme {
    /// Fill a subtree with data shaped like its export
    ///
    /// Unknown fields fail unless
    /// [`ignore_unknown_fields`](crate::SchemeConfig::ignore_unknown_fields)
    /// is set.
    ///
    /// # Errors
    /// - [`SchemeError::InvalidData`] for data of the wrong shape
    /// - [`SchemeError::UndeterminedProperty`] for option items without
    ///   their unique key
    /// - errors of [`Scheme::get`], [`Scheme::pick`] and [`Scheme::set_value`]
    pub fn initialize(&mut self, at: NodeId, data: &Value) -> Result<()> {
        let ignore = self.config().ignore_unknown_fields;
        self.fill(at, data, ignore)
    }

    /// [`Scheme::initialize`] skipping unknown fields regardless of config
    ///
    /// # Errors
    /// Same as [`Scheme::initialize`], except for unknown fields
    pub fn try_initialize(&mut self, at: NodeId, data: &Value) -> Result<()> {
        self.fill(at, data, true)
    }

    /// [`Scheme::initialize`] from JSON text
    ///
    /// # Errors
    /// Returns [`SchemeError::InvalidData`] for malformed JSON, and the
    /// errors of [`Scheme::initialize`] otherwise
    pub fn initialize_json(&mut self, at: NodeId, json: &str) -> Result<()> {
        let data: Value = serde_json::from_str(json).map_err(|e| {
            SchemeError::InvalidData(format!("JSON data for scheme initialization are corrupted: {e}"))
        })?;
        self.initialize(at, &data)
    }

    fn fill(&mut self, node: NodeId, data: &Value, ignore: bool) -> Result<()> {
        if self.node_type(node) == NodeType::Options {
            return self.fill_options(node, data, ignore);
        }

        let Value::Object(fields) = data else {
            return Err(SchemeError::InvalidData(format!(
                "Data for scheme initialization must be JSON object, {} given.",
                type_name(data)
            )));
        };

        for (name, content) in fields {
            let target = match self.get(node, name) {
                Ok(Entry::Node(target)) => target,
                Ok(Entry::Item(item)) => {
                    return Err(SchemeError::InvalidData(format!(
                        "Field '{name}' addresses array item '{}'.",
                        item.key()
                    )))
                }
                Err(err) if ignore && err.is_not_found() => {
                    tracing::debug!("Skipping unknown field '{}'", name);
                    continue;
                }
                Err(err) => return Err(err),
            };

            if self.is_leaf(target) {
                if content.is_null() {
                    self.clear_value(target)?;
                } else {
                    self.set_value(target, content.clone())?;
                }
            } else {
                self.fill(target, content, ignore)?;
            }
        }
        Ok(())
    }

    fn fill_options(&mut self, options: NodeId, data: &Value, ignore: bool) -> Result<()> {
        let Value::Array(elements) = data else {
            return Err(SchemeError::InvalidData(format!(
                "Data for options '{}' must be an array, {} given.",
                self.path(options),
                type_name(data)
            )));
        };

        if self.contains_primitives(options) {
            if self.candidate_keys(options).is_empty() {
                if !elements.is_empty() {
                    tracing::warn!(
                        "Options '{}' have no candidates, ignoring {} item(s)",
                        self.path(options),
                        elements.len()
                    );
                }
                return Ok(());
            }
            for element in elements {
                let key = element.get("key").unwrap_or(element);
                self.pick(options, &serialize_value(key), None)?;
            }
            return Ok(());
        }

        if self.candidate_templates(options).is_empty() {
            if elements.is_empty() {
                return Ok(());
            }
            return Err(SchemeError::InvalidData(format!(
                "Options '{}' have no candidates to initialize items from.",
                self.path(options)
            )));
        }

        for element in elements {
            self.fill_item(options, element, ignore)?;
        }
        Ok(())
    }

    /// Pick the item named by the unique key, then apply the other fields
    /// in candidate priority order
    fn fill_item(&mut self, options: NodeId, element: &Value, ignore: bool) -> Result<()> {
        let Value::Object(fields) = element else {
            return Err(SchemeError::InvalidData(format!(
                "Items of options '{}' must be JSON objects, {} given.",
                self.path(options),
                type_name(element)
            )));
        };

        let candidates = self.candidates(options, true);
        let mut item = None;
        for (name, &field) in &candidates {
            let Some(value) = fields.get(name).filter(|v| !v.is_null()) else {
                continue;
            };
            if self.is_unique_key(field) {
                item = self.pick(options, name, Some(value.clone()))?.as_node();
                continue;
            }
            let Some(item) = item else {
                return Err(self.missing_unique_key(options));
            };
            self.set(item, name, value.clone())?;
        }

        let Some(item) = item else {
            return Err(self.missing_unique_key(options));
        };
        let rest: Map<String, Value> = fields
            .iter()
            .filter(|(name, _)| !candidates.contains_key(name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        self.fill(item, &Value::Object(rest), ignore)
    }

    fn missing_unique_key(&self, options: NodeId) -> SchemeError {
        let unique = self
            .unique_key_property(options)
            .and_then(|field| self.name(field))
            .unwrap_or_default();
        SchemeError::UndeterminedProperty(format!(
            "No option candidate of '{}' picked up, unique key '{unique}' is missing.",
            self.path(options)
        ))
    }
}
