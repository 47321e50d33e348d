use std::fmt;

use bson::{Bson, Document};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::value::Pickable;

/// The result of a projection.
///
/// `Whole` borrows the input untouched: callers must not assume whether
/// they got the original back or a freshly built mapping.
pub enum Projection<'a> {
    /// The value as given, no field restriction applied.
    Whole(&'a dyn Pickable),
    /// Selected fields of a record, keyed by output name.
    Record(FieldMap<'a>),
    /// Element-wise projection of a sequence, same length and order.
    Sequence(Vec<Projection<'a>>),
}

impl<'a> Projection<'a> {
    pub fn is_whole(&self) -> bool {
        matches!(self, Projection::Whole(_))
    }

    pub fn as_record(&self) -> Option<&FieldMap<'a>> {
        match self {
            Projection::Record(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Projection<'a>]> {
        match self {
            Projection::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_bson(&self) -> Bson {
        match self {
            Projection::Whole(value) => value.value().to_bson(),
            Projection::Record(map) => Bson::Document(map.to_document()),
            Projection::Sequence(items) => Bson::Array(items.iter().map(Projection::to_bson).collect()),
        }
    }
}

impl fmt::Debug for Projection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::Whole(value) => f.debug_tuple("Whole").field(&value.value()).finish(),
            Projection::Record(map) => f.debug_tuple("Record").field(map).finish(),
            Projection::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
        }
    }
}

impl Serialize for Projection<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Projection::Whole(value) => value.value().serialize(serializer),
            Projection::Record(map) => map.serialize(serializer),
            Projection::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Output mapping of a record projection, in the record's field order.
#[derive(Default)]
pub struct FieldMap<'a> {
    entries: Vec<(&'a str, Projection<'a>)>,
}

impl<'a> FieldMap<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Projection<'a>> {
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set `key`, replacing (in place) and returning any previous value.
    pub fn insert(&mut self, key: &'a str, value: Projection<'a>) -> Option<Projection<'a>> {
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &Projection<'a>)> + '_ {
        self.entries.iter().map(|(name, value)| (*name, value))
    }

    pub fn to_document(&self) -> Document {
        self.entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_bson()))
            .collect()
    }
}

impl<'a> IntoIterator for FieldMap<'a> {
    type Item = (&'a str, Projection<'a>);
    type IntoIter = std::vec::IntoIter<(&'a str, Projection<'a>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Debug for FieldMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Serialize for FieldMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
