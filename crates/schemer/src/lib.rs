//! Schemer - self-describing configuration trees
//!
//! A [`Scheme`] describes which fields a configuration may hold and stores
//! their values in the same tree. Its shape depends on the values already
//! present:
//!
//! - a property may unlock *conditional siblings* for a given value
//! - options hold either static scalar items or items *picked* from a
//!   candidate template, each identified by a unique key property
//!
//! Nodes are addressed with [`SchemePath`] strings such as
//! `draws[prizeId=5].mechanics`.
//!
//! # Example
//!
//! ```rust
//! use schemer::{bag, candidates, property, Scheme};
//! use serde_json::json;
//!
//! let mut scheme = Scheme::new(bag([candidates(
//!     "draws",
//!     [bag([
//!         property("prizeId").unique_key(),
//!         property("mechanics").choices(["random", "nth"]).default("random"),
//!     ])],
//! )]))?;
//!
//! let root = scheme.root();
//! scheme.set(root, "draws[prizeId=5].mechanics", "nth")?;
//! assert_eq!(
//!     scheme.export()?,
//!     json!({ "draws": [{ "prizeId": 5, "mechanics": "nth" }] })
//! );
//! # Ok::<(), schemer::SchemeError>(())
//! ```

#![warn(unreachable_pub)]

// Core modules
mod array_item;
mod builder;
mod config;
mod error;
mod export;
mod initialize;
mod input;
mod node;
mod options;
mod path;
mod property;
mod provider;
mod resolve;
mod scheme;
mod traverser;
pub mod value;

// Re-exports
pub use array_item::ArrayItem;
pub use builder::{
    bag, candidates, candidates_from, group, options, options_from, property, Decl, OptionEntry,
    OptionsDecl, PropertyDecl,
};
pub use config::SchemeConfig;
pub use error::{Result, SchemeError};
pub use input::{issue_message, validate_single, Input, Validator};
pub use node::{NodeId, NodeType};
pub use options::Entry;
pub use path::{PathError, SchemePath, Segment, Selector, WILDCARD};
pub use provider::{
    ManyValuesProvider, PropertyHandle, ProviderKind, ScalarProvider, StaticArrayProvider,
    UserValueProvider, ValueProvider,
};
pub use scheme::Scheme;
pub use traverser::{Traverser, Visit};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
