//! Scheme configuration

use serde::{Deserialize, Serialize};

/// Behaviour switches of a [`Scheme`](crate::Scheme)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemeConfig {
    /// Skip unknown fields during bulk initialization instead of failing
    pub ignore_unknown_fields: bool,
    /// Indent JSON produced by `to_json`
    pub pretty_json: bool,
    /// Fail export on conditional properties without a value
    ///
    /// When disabled, undetermined conditional siblings are left out.
    pub strict_export: bool,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            ignore_unknown_fields: false,
            pretty_json: false,
            strict_export: true,
        }
    }
}

impl SchemeConfig {
    /// Create default config
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: skip unknown fields on initialization
    #[inline]
    #[must_use]
    pub fn with_ignore_unknown_fields(mut self, ignore: bool) -> Self {
        self.ignore_unknown_fields = ignore;
        self
    }

    /// Builder: pretty-printed JSON export
    #[inline]
    #[must_use]
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }

    /// Builder: strict export of conditional properties
    #[inline]
    #[must_use]
    pub fn with_strict_export(mut self, strict: bool) -> Self {
        self.strict_export = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SchemeConfig::new();
        assert!(!config.ignore_unknown_fields);
        assert!(!config.pretty_json);
        assert!(config.strict_export);
    }

    #[test]
    fn builder_chain() {
        let config = SchemeConfig::new()
            .with_ignore_unknown_fields(true)
            .with_pretty_json(true)
            .with_strict_export(false);
        assert!(config.ignore_unknown_fields);
        assert!(config.pretty_json);
        assert!(!config.strict_export);
    }

    #[test]
    fn deserializes_partial_config() {
        let config: SchemeConfig = serde_json::from_str(r#"{"pretty_json": true}"#).unwrap();
        assert!(config.pretty_json);
        assert!(config.strict_export);
    }
}
