//! Error types for scheme trees
//!
//! Every failing operation on a [`Scheme`](crate::Scheme) reports one of the
//! [`SchemeError`] kinds. Messages carry the path of the offending node so a
//! caller can show them without further context.

use crate::path::PathError;

/// Main scheme error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemeError {
    /// Structural misuse: wrong node kind, group mutation, too many candidates
    #[error("invalid node: {0}")]
    InvalidNode(String),

    /// Value rejected by a provider, validator or options constraint
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Structural candidate without exactly one unique key
    #[error("invalid unique key: {0}")]
    InvalidUniqueKey(String),

    /// Path resolution, pick or get could not locate the target
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// Governing value of a conditional structure is not known yet
    #[error("undetermined property: {0}")]
    UndeterminedProperty(String),

    /// Child name already used in the same node
    #[error("existing name: {0}")]
    ExistingName(String),

    /// Unique key value already picked in the same options
    #[error("duplicate unique key: {0}")]
    DuplicateUniqueKey(String),

    /// Conditional registration repeated for the same trigger
    #[error("already defined: {0}")]
    AlreadyDefined(String),

    /// Initialization data of an unsupported shape
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Malformed path string
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
}

impl SchemeError {
    /// Check if the error only reports a missing item
    ///
    /// This is the single kind swallowed by the `try_*` operations.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound(_))
    }

    /// Check if the error is caused by an undetermined conditional value
    #[inline]
    #[must_use]
    pub fn is_undetermined(&self) -> bool {
        matches!(self, Self::UndeterminedProperty(_))
    }

    /// Check if the error is an identity collision
    #[inline]
    #[must_use]
    pub fn is_collision(&self) -> bool {
        matches!(self, Self::ExistingName(_) | Self::DuplicateUniqueKey(_))
    }

    /// Error message without the kind prefix
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::InvalidNode(msg)
            | Self::InvalidValue(msg)
            | Self::InvalidUniqueKey(msg)
            | Self::ItemNotFound(msg)
            | Self::UndeterminedProperty(msg)
            | Self::ExistingName(msg)
            | Self::DuplicateUniqueKey(msg)
            | Self::AlreadyDefined(msg)
            | Self::InvalidData(msg) => msg.clone(),
            Self::InvalidPath(err) => err.to_string(),
        }
    }
}

/// Result alias used across the crate
pub type Result<T, E = SchemeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_item_not_found_is_not_found() {
        assert!(SchemeError::ItemNotFound("x".into()).is_not_found());
        assert!(!SchemeError::InvalidNode("x".into()).is_not_found());
        assert!(!SchemeError::UndeterminedProperty("x".into()).is_not_found());
    }

    #[test]
    fn collisions() {
        assert!(SchemeError::ExistingName("x".into()).is_collision());
        assert!(SchemeError::DuplicateUniqueKey("x".into()).is_collision());
        assert!(!SchemeError::AlreadyDefined("x".into()).is_collision());
    }

    #[test]
    fn display_carries_kind_prefix() {
        let err = SchemeError::InvalidValue("Value 'x' is wrong.".into());
        assert_eq!(err.to_string(), "invalid value: Value 'x' is wrong.");
        assert_eq!(err.message(), "Value 'x' is wrong.");
    }

    #[test]
    fn path_errors_convert() {
        let err: SchemeError = PathError::EmptySegment.into();
        assert!(matches!(err, SchemeError::InvalidPath(PathError::EmptySegment)));
    }
}
