//! Field projection for structured values.
//!
//! [`pick`] takes a record (or a reference, box, optional or sequence of
//! records) and a list of dotted field paths, and returns only the selected
//! fields, recursing into nested records:
//!
//! ```
//! use pick::{Bson, Record, pick};
//! use bson::doc;
//!
//! #[derive(Record)]
//! struct Address {
//!     city: String,
//!     zip: String,
//! }
//!
//! #[derive(Record)]
//! struct User {
//!     #[pick(rename = "userName")]
//!     name: String,
//!     address: Address,
//!     #[pick(omit_empty)]
//!     nickname: Option<String>,
//! }
//!
//! let user = User {
//!     name: "Ada".into(),
//!     address: Address { city: "London".into(), zip: "N1".into() },
//!     nickname: None,
//! };
//! let picked = pick(&user, &["userName", "address.city", "nickname"]);
//! assert_eq!(
//!     picked.to_bson(),
//!     Bson::Document(doc! { "userName": "Ada", "address": { "city": "London" } })
//! );
//! ```
//!
//! With no paths the input comes back whole, untouched.

mod field_tree;
mod projection;
mod record;
mod value;
mod walk;

use tracing::trace;

pub use bson::{Bson, Document};
pub use field_tree::FieldTree;
pub use projection::{FieldMap, Projection};
pub use record::{Field, Record, Tag};
pub use value::{Pickable, Value};
pub use walk::project;

#[cfg(feature = "derive")]
pub use pick_derive::Record;

#[doc(hidden)]
pub mod __private {
    pub use crate::value::{OpaqueZero, PickableZero, ZeroCheck};
}

/// Project `value` down to the fields named by `paths`.
///
/// Paths are dotted (`"address.city"`). An empty list returns the value
/// whole. Never fails: values without named fields pass through unchanged.
pub fn pick<'a, T: Pickable, S: AsRef<str>>(value: &'a T, paths: &[S]) -> Projection<'a> {
    trace!(paths = paths.len(), "pick");
    let tree = FieldTree::from_paths(paths);
    project(value, &tree)
}

/// Same as [`pick`].
pub fn pluck<'a, T: Pickable, S: AsRef<str>>(value: &'a T, paths: &[S]) -> Projection<'a> {
    pick(value, paths)
}
