//! Scheme paths for addressing nodes within a tree
//!
//! Provides [`SchemePath`], the dotted and bracketed addressing language:
//!
//! ```text
//! segment  := field ["=" value] ["[" selector "]"]
//! selector := key ["=" value]
//! path     := segment ("." segment)*
//! ```
//!
//! # Examples
//! - `draws[prizeId=5].mechanics` picks the `prizeId=5` item of `draws`
//! - `draws[prizeId=*].mechanics` addresses the candidate template
//! - `type=contest.rounds` binds `type` before descending

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Wildcard selector value
pub const WILDCARD: &str = "*";

/// Bracketed item selector of a segment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    key: String,
    value: Option<String>,
}

impl Selector {
    /// Create selector from key and optional value
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Selector key (field name, or item key when no value is bound)
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Bound value, if any
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Check for the `[key=*]` form
    #[inline]
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.value.as_deref() == Some(WILDCARD)
    }

    /// Pick definition as written between the brackets
    #[must_use]
    pub fn definition(&self) -> String {
        match &self.value {
            Some(value) => format!("{}={}", self.key, value),
            None => self.key.clone(),
        }
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.definition())
    }
}

/// Single path segment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    field: String,
    binding: Option<String>,
    selector: Option<Selector>,
}

impl Segment {
    /// Segment addressing a named child
    #[inline]
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            field: name.into(),
            binding: None,
            selector: None,
        }
    }

    /// Builder: bind a value to the field (`field=value`)
    #[inline]
    #[must_use]
    pub fn with_binding(mut self, value: impl Into<String>) -> Self {
        self.binding = Some(value.into());
        self
    }

    /// Builder: attach an item selector (`field[key=value]`)
    #[inline]
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Field name, empty when the segment is a bare selector
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.field
    }

    /// Value bound to the field
    #[inline]
    #[must_use]
    pub fn binding(&self) -> Option<&str> {
        self.binding.as_deref()
    }

    /// Item selector
    #[inline]
    #[must_use]
    pub fn selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.field)?;
        if let Some(binding) = &self.binding {
            write!(f, "={binding}")?;
        }
        if let Some(selector) = &self.selector {
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

impl FromStr for Segment {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, selector) = match s.find('[') {
            Some(open) => {
                let rest = &s[open + 1..];
                let close = rest
                    .find(']')
                    .ok_or_else(|| PathError::UnclosedSelector(s.to_string()))?;
                if close + 1 != rest.len() {
                    return Err(PathError::TrailingCharacters(s.to_string()));
                }
                let inner = &rest[..close];
                let selector = match inner.split_once('=') {
                    Some((key, value)) => Selector::new(key, Some(value.to_string())),
                    None => Selector::new(inner, None),
                };
                if selector.key.is_empty() {
                    return Err(PathError::EmptySelectorKey(s.to_string()));
                }
                (&s[..open], Some(selector))
            }
            None => (s, None),
        };

        let (field, binding) = match head.split_once('=') {
            Some((field, value)) => (field, Some(value.to_string())),
            None => (head, None),
        };

        if field.is_empty() && (selector.is_none() || binding.is_some()) {
            return Err(PathError::EmptySegment);
        }

        Ok(Self {
            field: field.to_string(),
            binding,
            selector,
        })
    }
}

/// Path within a scheme tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SchemePath(Vec<Segment>);

impl SchemePath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Empty path (the node itself)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get last segment
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: Segment) -> Self {
        let mut new = self.clone();
        new.0.push(segment);
        new
    }

    /// Check if any segment carries a wildcard selector
    #[inline]
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.0
            .iter()
            .any(|seg| seg.selector().is_some_and(Selector::is_wildcard))
    }
}

impl Display for SchemePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for SchemePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        split_segments(s)?
            .into_iter()
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl From<Vec<Segment>> for SchemePath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

/// Split on dots outside of brackets
fn split_segments(s: &str) -> Result<Vec<&str>, PathError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth > 0 {
        return Err(PathError::UnclosedSelector(s.to_string()));
    }
    parts.push(&s[start..]);
    Ok(parts)
}

/// Errors related to scheme paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Selector bracket not closed
    #[error("unclosed selector in '{0}'")]
    UnclosedSelector(String),

    /// Selector without key (`[]` or `[=x]`)
    #[error("selector without key in '{0}'")]
    EmptySelectorKey(String),

    /// Characters after the closing bracket of a selector
    #[error("unexpected characters after selector in '{0}'")]
    TrailingCharacters(String),
}
