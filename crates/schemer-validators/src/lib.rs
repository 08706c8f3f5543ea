//! Input validators for schemer properties
//!
//! Each [`Validator`](schemer::Validator) wraps submitted values into an
//! [`Input`](schemer::Input) that knows whether it is valid and why not.
//! [`InputSet`] fetches several inputs at once.
//!
//! ```rust
//! use schemer::{bag, property, Scheme};
//! use schemer_validators::numeric;
//!
//! let mut scheme = Scheme::new(bag([property("limit").validated(numeric())]))?;
//! let root = scheme.root();
//! scheme.set(root, "limit", "5")?;
//! assert!(scheme.set(root, "limit", "many").is_err());
//! # Ok::<(), schemer::SchemeError>(())
//! ```

#![warn(unreachable_pub)]

mod array;
mod basic;
mod custom;
mod error;
mod input_set;
mod rules;
mod strings;

pub use array::ArrayOf;
pub use basic::{BasicInput, Modifier, Rule};
pub use custom::{Check, CustomInput};
pub use error::{InputError, Result};
pub use input_set::InputSet;
pub use rules::{
    array_of, boolean, custom, date_time, nullable_array_of, nullable_boolean, nullable_date_time,
    nullable_numeric, nullable_text, numeric, text, ArrayOfValidator, CustomValidator, RuleValidator,
    SharedValidator,
};
pub use strings::{first_upper, to_camel_case, to_snake_case};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
