//! Typed data store for repro reports.
//!
//! Holds the externally computed values a report document references and
//! resolves the dotted/indexed paths used by insertion directives.
//!
//! # Entry model
//!
//! Every node is an [`Entry`]: either a [`Leaf`] (value plus metadata record)
//! or a nested mapping. Records are TOML tables with a `value` field or a
//! `type = "file"` tag; any other table is a nested mapping.
//!
//! ```toml
//! [results.accuracy]
//! value = 0.93
//! description = "Held-out accuracy"
//! published_url = "https://example.org/runs/17"
//! ```
//!
//! # Resolution
//!
//! [`DataStore::resolve`] distinguishes absence (`Ok(None)`) from malformed
//! data ([`LookupError`]). File entries are additionally reachable through
//! their [`filepath_alias`].

mod alias;
mod entry;
mod path;
mod store;

pub use alias::filepath_alias;
pub use entry::{Entry, Leaf, Metadata, is_truthy, value_text};
pub use path::lookup_dotted;
pub use store::{DataStore, LookupError, Resolved, StoreError};

pub use toml::{Table, Value};
