//! Mapping between scheme paths, input names and labels

/// Default prefix of input names
pub const INPUT_PREFIX: &str = "scheme__";

/// Input name of a scheme path
///
/// The path is hex encoded so that the name only holds characters accepted
/// by any form renderer.
#[must_use]
pub fn input_name(prefix: &str, path: &str) -> String {
    format!("{prefix}{}", hex::encode(path))
}

/// Scheme path of an input name, `None` for foreign names
#[must_use]
pub fn scheme_path(prefix: &str, name: &str) -> Option<String> {
    let encoded = name.strip_prefix(prefix)?;
    let bytes = hex::decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

/// Translation of slugs (`name`, `name:value`) into labels
pub trait HumanReadableSlug {
    /// Label for a slug
    fn transform(&self, slug: &str) -> String {
        slug.to_string()
    }
}

/// Labels equal to their slugs
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySlug;

impl HumanReadableSlug for IdentitySlug {}

impl<F> HumanReadableSlug for F
where
    F: Fn(&str) -> String,
{
    fn transform(&self, slug: &str) -> String {
        self(slug)
    }
}
