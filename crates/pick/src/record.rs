use std::fmt;

use tracing::trace;

use crate::value::Pickable;

/// A value with named fields.
///
/// Usually derived with `#[derive(Record)]`. Hand-written impls list fields
/// in declaration order:
///
/// ```
/// use pick::{Field, Pickable, Record, Value};
///
/// struct Account {
///     name: String,
///     tags: Vec<String>,
/// }
///
/// impl Record for Account {
///     fn fields(&self) -> Vec<Field<'_>> {
///         vec![
///             Field::new("Name", &self.name).rename("name"),
///             Field::tagged("Tags", "tags,omitempty", &self.tags),
///         ]
///     }
/// }
///
/// impl Pickable for Account {
///     fn value(&self) -> Value<'_> {
///         Value::Record(self)
///     }
/// }
/// ```
pub trait Record {
    fn fields(&self) -> Vec<Field<'_>>;

    /// Whether every field holds its zero value.
    ///
    /// The default only sees what [`fields`](Record::fields) exposes. The
    /// derive overrides it to also cover skipped fields, so a record whose
    /// only data sits in a hidden field is not treated as empty.
    fn is_zero(&self) -> bool {
        self.fields().iter().all(|field| field.value.is_empty())
    }
}

/// Parsed form of a `"name,omitempty"` field tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Output name; `None` keeps the declared name.
    pub name: Option<&'a str>,
    pub omit_empty: bool,
}

impl<'a> Tag<'a> {
    /// Everything before the first comma is the name, an empty name keeps
    /// the declared one. Only the `omitempty` option is recognized; other
    /// options are ignored.
    pub fn parse(tag: &'a str) -> Tag<'a> {
        let mut items = tag.split(',');
        let name = items.next().filter(|name| !name.is_empty());
        let omit_empty = items.any(|item| item == "omitempty");
        Tag { name, omit_empty }
    }
}

/// One declared field of a [`Record`].
#[derive(Clone, Copy)]
pub struct Field<'a> {
    name: &'a str,
    alias: Option<&'a str>,
    omit_empty: bool,
    embedded: bool,
    value: &'a dyn Pickable,
}

impl<'a> Field<'a> {
    pub fn new(name: &'a str, value: &'a dyn Pickable) -> Self {
        Field {
            name,
            alias: None,
            omit_empty: false,
            embedded: false,
            value,
        }
    }

    /// A field described by a `"name,omitempty"` tag.
    pub fn tagged(name: &'a str, tag: &'a str, value: &'a dyn Pickable) -> Self {
        let tag = Tag::parse(tag);
        Field {
            alias: tag.name,
            omit_empty: tag.omit_empty,
            ..Field::new(name, value)
        }
    }

    /// A field whose record's fields are promoted into the parent.
    ///
    /// `name` is only used for diagnostics; the field never appears under it.
    pub fn embedded(name: &'a str, value: &'a dyn Pickable) -> Self {
        Field {
            embedded: true,
            ..Field::new(name, value)
        }
    }

    pub fn rename(mut self, alias: &'a str) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// Declared name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Name used for matching paths and for the output key.
    pub fn key(&self) -> &'a str {
        self.alias.unwrap_or(self.name)
    }

    pub fn omits_empty(&self) -> bool {
        self.omit_empty
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn value(&self) -> &'a dyn Pickable {
        self.value
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("omit_empty", &self.omit_empty)
            .field("embedded", &self.embedded)
            .field("value", &self.value.value())
            .finish()
    }
}

/// A field as it appears in the record's output namespace.
#[derive(Clone, Copy)]
pub(crate) struct Entry<'a> {
    pub(crate) name: &'a str,
    pub(crate) value: &'a dyn Pickable,
}

/// Flatten a record's fields into its output namespace, in declaration order.
///
/// Embedded records contribute their own entries, but only names nobody has
/// claimed yet, so an earlier embedding beats a later one. Named fields
/// always claim their name, replacing anything promoted from an embedding.
/// Omit-if-empty fields holding an empty value contribute nothing.
pub(crate) fn entries<'a>(record: &'a dyn Record) -> Vec<Entry<'a>> {
    let mut out: Vec<Entry<'a>> = Vec::new();
    for field in record.fields() {
        if field.embedded {
            let Some(inner) = field.value.value().as_record() else {
                trace!(field = field.name, "embedded field holds no record");
                continue;
            };
            for entry in entries(inner) {
                if !out.iter().any(|existing| existing.name == entry.name) {
                    out.push(entry);
                }
            }
            continue;
        }

        if field.omit_empty && field.value.is_empty() {
            continue;
        }

        let entry = Entry {
            name: field.key(),
            value: field.value,
        };
        match out.iter_mut().find(|existing| existing.name == entry.name) {
            Some(slot) => *slot = entry,
            None => out.push(entry),
        }
    }
    out
}
