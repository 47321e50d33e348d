//! Procedural macros for pick
//!
//! `#[derive(Record)]` implements `pick::Record` and `pick::Pickable` for a
//! struct with named fields.

use proc_macro::TokenStream;

mod record;

/// Derive `pick::Record` (and `pick::Pickable`) from a struct's fields.
///
/// # Field attributes
///
/// - `#[pick(rename = "...")]` - Output name used for matching and as the key
/// - `#[pick(omit_empty)]` - Drop the field when its value is empty
/// - `#[pick(tag = "name,omitempty")]` - Both of the above as a tag string
/// - `#[pick(flatten)]` - Promote the nested record's fields into this one
/// - `#[pick(skip)]` - Never expose the field
///
/// `#[serde(rename)]`, `#[serde(flatten)]`, `#[serde(skip)]`,
/// `#[serde(skip_serializing)]` and `#[serde(skip_serializing_if)]` are read
/// too, so projections line up with the type's serde output. `#[pick]`
/// takes precedence.
///
/// Flattening a map (`HashMap`, `BTreeMap`, bson `Document`) is rejected:
/// only records can be promoted.
///
/// # Example
///
/// ```ignore
/// #[derive(Serialize, Record)]
/// pub struct Account {
///     #[serde(rename = "accountName")]
///     name: String,
///     #[pick(omit_empty)]
///     tags: Vec<String>,
///     #[serde(flatten)]
///     audit: Audit,
/// }
/// ```
#[proc_macro_derive(Record, attributes(pick, serde))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record_impl(input)
}
