//! Export of trees into plain JSON

use serde_json::{json, Map, Value};

use crate::error::{Result, SchemeError};
use crate::node::{NodeId, NodeType};
use crate::options::Entry;
use crate::scheme::Scheme;

impl Scheme {
    /// Plain JSON form of a subtree
    ///
    /// Bags export as objects, leaves as their effective value, options as
    /// arrays. With [`strict_export`](crate::SchemeConfig::strict_export) an
    /// undetermined conditional property fails the export instead of being
    /// left out.
    ///
    /// # Errors
    /// - [`SchemeError::InvalidNode`] for groups
    /// - [`SchemeError::UndeterminedProperty`] under strict export
    pub fn to_value(&self, id: NodeId) -> Result<Value> {
        match self.node_type(id) {
            NodeType::Group => Err(SchemeError::InvalidNode(
                "Cannot export scheme group into JSON.".into(),
            )),
            NodeType::Options => self
                .items(id)
                .into_iter()
                .map(|entry| match entry {
                    Entry::Item(item) => Ok(json!({ "key": item.key(), "value": item.value() })),
                    Entry::Node(node) => self.to_value(node),
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            NodeType::Property if self.is_leaf(id) => Ok(self.value(id).unwrap_or(Value::Null)),
            NodeType::Property | NodeType::Bag => {
                let mut object = Map::new();
                for child in self.children(id, !self.config().strict_export)? {
                    let Some(name) = self.name(child) else {
                        continue;
                    };
                    object.insert(name.to_string(), self.to_value(child)?);
                }
                Ok(Value::Object(object))
            }
        }
    }

    /// JSON text of a subtree, pretty printed when configured
    ///
    /// # Errors
    /// Same as [`Scheme::to_value`]
    pub fn to_json(&self, id: NodeId) -> Result<String> {
        let value = self.to_value(id)?;
        let text = if self.config().pretty_json {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        text.map_err(|e| SchemeError::InvalidData(format!("Cannot serialize scheme: {e}")))
    }

    /// Plain JSON form of the whole tree
    ///
    /// # Errors
    /// Same as [`Scheme::to_value`]
    pub fn export(&self) -> Result<Value> {
        self.to_value(self.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{bag, candidates, group, options, property};
    use crate::config::SchemeConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn exports_bags_and_leaves() {
        let mut scheme = Scheme::new(bag([
            property("title"),
            property("settings").children([property("mode").default("fast")]),
        ]))
        .unwrap();
        let root = scheme.root();
        scheme.set(root, "title", "Spring").unwrap();
        assert_eq!(
            scheme.export().unwrap(),
            json!({ "title": "Spring", "settings": { "mode": "fast" } })
        );
    }

    #[test]
    fn exports_options() {
        let mut scheme = Scheme::new(bag([
            options("colors", ["red"]),
            candidates("draws", [bag([property("prizeId").unique_key(), property("note")])]),
        ]))
        .unwrap();
        let root = scheme.root();
        scheme.set(root, "draws[prizeId=1].note", "first").unwrap();
        assert_eq!(
            scheme.export().unwrap(),
            json!({
                "colors": [{ "key": "red", "value": "red" }],
                "draws": [{ "prizeId": 1, "note": "first" }],
            })
        );
    }

    #[test]
    fn strict_export_fails_on_undetermined() {
        let decl = bag([property("type").choices(["a"]).on("a", property("x"))]);
        let scheme = Scheme::new(decl.clone()).unwrap();
        assert!(scheme.export().unwrap_err().is_undetermined());

        let lenient = Scheme::with_config(decl, SchemeConfig::new().with_strict_export(false)).unwrap();
        assert_eq!(lenient.export().unwrap(), json!({ "type": null }));
    }

    #[test]
    fn conditional_siblings_exported_inline() {
        let mut scheme = Scheme::new(bag([
            property("type").choices(["a"]).on("a", group([property("x").default(1), property("y")])),
        ]))
        .unwrap();
        let root = scheme.root();
        scheme.set(root, "type", "a").unwrap();
        assert_eq!(scheme.export().unwrap(), json!({ "type": "a", "x": 1, "y": null }));
    }

    #[test]
    fn group_export_fails() {
        let scheme = Scheme::new(bag([property("type").on("a", group([property("x")]))])).unwrap();
        let kind = scheme.child(scheme.root(), "type").unwrap();
        let payload = scheme.conditional_siblings(kind)["a"];
        assert_eq!(
            scheme.to_value(payload).unwrap_err(),
            SchemeError::InvalidNode("Cannot export scheme group into JSON.".into())
        );
    }

    #[test]
    fn json_text() {
        let scheme = Scheme::new(bag([property("a").value(1)])).unwrap();
        assert_eq!(scheme.to_json(scheme.root()).unwrap(), r#"{"a":1}"#);

        let pretty = Scheme::with_config(bag([property("a").value(1)]), SchemeConfig::new().with_pretty_json(true)).unwrap();
        assert_eq!(pretty.to_json(pretty.root()).unwrap(), "{\n  \"a\": 1\n}");
    }
}
