//! Form errors

use schemer::SchemeError;

/// Errors raised while building forms or applying submitted values
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Scheme operation failed
    #[error(transparent)]
    Scheme(#[from] SchemeError),

    /// Submitted input name matches no field
    #[error("unknown input: {0}")]
    UnknownInput(String),

    /// Property cannot be rendered as a form field
    #[error("unsupported property: {0}")]
    UnsupportedProperty(String),
}

/// Result type for form operations
pub type Result<T, E = FormError> = std::result::Result<T, E>;
