//! Form fields for schemer trees
//!
//! [`SchemeForm`] walks a [`Scheme`](schemer::Scheme) and describes every
//! leaf a user can edit as a [`FieldSpec`]: control type, choices, current
//! value and the input name under which the value comes back. Rendering is
//! left to a [`FormExtender`]; submitted values go back through
//! [`SchemeForm::update_scheme`].

#![warn(unreachable_pub)]

// Core modules
mod error;
mod form;
mod spec;
mod transform;

// Re-exports
pub use error::{FormError, Result};
pub use form::{FormExtender, SchemeForm, SchemeFormBuilder};
pub use spec::{FieldRecord, FieldSpec, InputType};
pub use transform::{input_name, scheme_path, HumanReadableSlug, IdentitySlug, INPUT_PREFIX};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
