//! Validation errors

/// Errors raised while fetching validated input values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// An input failed its rule; the message names the input and the issue
    #[error("invalid user input: {0}")]
    InvalidUserInput(String),

    /// Two inputs would be collected under the same key
    #[error("ambiguous key: {0}")]
    AmbiguousKey(String),
}

impl InputError {
    /// Message without the kind prefix
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidUserInput(msg) | Self::AmbiguousKey(msg) => msg,
        }
    }
}

/// Result type for input fetching
pub type Result<T, E = InputError> = std::result::Result<T, E>;
