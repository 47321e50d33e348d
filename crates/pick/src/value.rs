use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use bson::oid::ObjectId;
use bson::{Bson, DateTime, Document};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::record::{self, Record};

/// Anything the walker can look at.
///
/// Records implement this through `#[derive(Record)]`; std containers,
/// primitives and bson values are covered here.
pub trait Pickable {
    fn value(&self) -> Value<'_>;

    /// Whether this value equals its type's zero value, for omit-if-empty
    /// fields.
    ///
    /// Optionals are empty only when they hold nothing: `Some(0)` is not
    /// empty. Records are empty when [`Record::is_zero`] says so. Types
    /// that can answer from a borrow override this to skip the snapshot.
    fn is_empty(&self) -> bool {
        self.value().is_empty()
    }
}

/// The shape of a [`Pickable`] as seen by the walker.
///
/// Scalars are snapshotted into [`Bson`]; everything else borrows from the
/// underlying value so it can still be handed back whole.
pub enum Value<'a> {
    /// Primitives, maps, bson documents, anything without named fields.
    Scalar(Bson),
    Record(&'a dyn Record),
    Sequence(Vec<&'a dyn Pickable>),
    /// One level of indirection that may hold nothing.
    Optional(Option<&'a dyn Pickable>),
}

impl<'a> Value<'a> {
    /// The record behind this value, looking through optionals.
    pub fn as_record(&self) -> Option<&'a dyn Record> {
        match *self {
            Value::Record(record) => Some(record),
            Value::Optional(Some(inner)) => inner.value().as_record(),
            _ => None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Value::Scalar(bson) => is_empty_bson(bson),
            Value::Record(record) => record.is_zero(),
            Value::Sequence(items) => items.is_empty(),
            Value::Optional(inner) => inner.is_none(),
        }
    }

    /// Materialize the whole value, records included, as bson.
    pub fn to_bson(&self) -> Bson {
        match self {
            Value::Scalar(bson) => bson.clone(),
            Value::Record(record) => Bson::Document(
                record::entries(*record)
                    .into_iter()
                    .map(|entry| (entry.name.to_string(), entry.value.value().to_bson()))
                    .collect(),
            ),
            Value::Sequence(items) => {
                Bson::Array(items.iter().map(|item| item.value().to_bson()).collect())
            }
            Value::Optional(Some(inner)) => inner.value().to_bson(),
            Value::Optional(None) => Bson::Null,
        }
    }
}

fn is_empty_bson(bson: &Bson) -> bool {
    match bson {
        Bson::Boolean(v) => !v,
        Bson::Int32(v) => *v == 0,
        Bson::Int64(v) => *v == 0,
        Bson::Double(v) => *v == 0.0,
        Bson::String(v) => v.is_empty(),
        Bson::Array(v) => v.is_empty(),
        Bson::Document(v) => v.is_empty(),
        Bson::Binary(v) => v.bytes.is_empty(),
        Bson::Null | Bson::Undefined => true,
        _ => false,
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(bson) => f.debug_tuple("Scalar").field(bson).finish(),
            Value::Record(_) => f.debug_tuple("Record").field(&self.to_bson()).finish(),
            Value::Sequence(items) => f
                .debug_tuple("Sequence")
                .field(&items.iter().map(|item| item.value()).collect::<Vec<_>>())
                .finish(),
            Value::Optional(inner) => f
                .debug_tuple("Optional")
                .field(&inner.map(|inner| inner.value()))
                .finish(),
        }
    }
}

impl Serialize for Value<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(bson) => bson.serialize(serializer),
            Value::Record(record) => {
                let entries = record::entries(*record);
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for entry in &entries {
                    map.serialize_entry(entry.name, &entry.value.value())?;
                }
                map.end()
            }
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&item.value())?;
                }
                seq.end()
            }
            Value::Optional(Some(inner)) => inner.value().serialize(serializer),
            Value::Optional(None) => serializer.serialize_none(),
        }
    }
}

// ── Scalars ─────────────────────────────────────────────────

macro_rules! scalar {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl Pickable for $ty {
                fn value(&self) -> Value<'_> {
                    let $v = self;
                    Value::Scalar($conv)
                }
            }
        )*
    };
}

scalar! {
    bool => |v| Bson::Boolean(*v),
    i8 => |v| Bson::Int32(i32::from(*v)),
    i16 => |v| Bson::Int32(i32::from(*v)),
    i32 => |v| Bson::Int32(*v),
    i64 => |v| Bson::Int64(*v),
    isize => |v| Bson::Int64(*v as i64),
    u8 => |v| Bson::Int32(i32::from(*v)),
    u16 => |v| Bson::Int32(i32::from(*v)),
    u32 => |v| Bson::Int64(i64::from(*v)),
    // bson has no unsigned 64-bit type; out-of-range values degrade to doubles.
    u64 => |v| i64::try_from(*v).map(Bson::Int64).unwrap_or(Bson::Double(*v as f64)),
    usize => |v| i64::try_from(*v).map(Bson::Int64).unwrap_or(Bson::Double(*v as f64)),
    f32 => |v| Bson::Double(f64::from(*v)),
    f64 => |v| Bson::Double(*v),
    ObjectId => |v| Bson::ObjectId(*v),
    DateTime => |v| Bson::DateTime(*v),
}

impl Pickable for char {
    fn value(&self) -> Value<'_> {
        Value::Scalar(Bson::String(self.to_string()))
    }

    fn is_empty(&self) -> bool {
        *self == '\0'
    }
}

impl Pickable for str {
    fn value(&self) -> Value<'_> {
        Value::Scalar(Bson::String(self.to_owned()))
    }

    fn is_empty(&self) -> bool {
        str::is_empty(self)
    }
}

impl Pickable for String {
    fn value(&self) -> Value<'_> {
        Value::Scalar(Bson::String(self.clone()))
    }

    fn is_empty(&self) -> bool {
        String::is_empty(self)
    }
}

impl Pickable for Bson {
    fn value(&self) -> Value<'_> {
        Value::Scalar(self.clone())
    }

    fn is_empty(&self) -> bool {
        is_empty_bson(self)
    }
}

impl Pickable for Document {
    fn value(&self) -> Value<'_> {
        Value::Scalar(Bson::Document(self.clone()))
    }

    fn is_empty(&self) -> bool {
        Document::is_empty(self)
    }
}

fn map_document<'m, V: Pickable + 'm>(entries: impl Iterator<Item = (&'m String, &'m V)>) -> Bson {
    Bson::Document(
        entries
            .map(|(key, value)| (key.clone(), value.value().to_bson()))
            .collect(),
    )
}

impl<V: Pickable> Pickable for HashMap<String, V> {
    fn value(&self) -> Value<'_> {
        Value::Scalar(map_document(self.iter()))
    }

    fn is_empty(&self) -> bool {
        HashMap::is_empty(self)
    }
}

impl<V: Pickable> Pickable for BTreeMap<String, V> {
    fn value(&self) -> Value<'_> {
        Value::Scalar(map_document(self.iter()))
    }

    fn is_empty(&self) -> bool {
        BTreeMap::is_empty(self)
    }
}

// ── Indirection ─────────────────────────────────────────────

impl<T: Pickable + ?Sized> Pickable for &T {
    fn value(&self) -> Value<'_> {
        (**self).value()
    }

    fn is_empty(&self) -> bool {
        Pickable::is_empty(&**self)
    }
}

impl<T: Pickable + ?Sized> Pickable for Box<T> {
    fn value(&self) -> Value<'_> {
        (**self).value()
    }

    fn is_empty(&self) -> bool {
        Pickable::is_empty(&**self)
    }
}

impl<T: Pickable + ?Sized> Pickable for Rc<T> {
    fn value(&self) -> Value<'_> {
        (**self).value()
    }

    fn is_empty(&self) -> bool {
        Pickable::is_empty(&**self)
    }
}

impl<T: Pickable + ?Sized> Pickable for Arc<T> {
    fn value(&self) -> Value<'_> {
        (**self).value()
    }

    fn is_empty(&self) -> bool {
        Pickable::is_empty(&**self)
    }
}

impl<T: Pickable> Pickable for Option<T> {
    fn value(&self) -> Value<'_> {
        Value::Optional(self.as_ref().map(|v| v as &dyn Pickable))
    }

    fn is_empty(&self) -> bool {
        self.is_none()
    }
}

// ── Sequences ───────────────────────────────────────────────

impl<T: Pickable> Pickable for [T] {
    fn value(&self) -> Value<'_> {
        Value::Sequence(self.iter().map(|v| v as &dyn Pickable).collect())
    }

    fn is_empty(&self) -> bool {
        <[T]>::is_empty(self)
    }
}

impl<T: Pickable, const N: usize> Pickable for [T; N] {
    fn value(&self) -> Value<'_> {
        self.as_slice().value()
    }

    fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<T: Pickable> Pickable for Vec<T> {
    fn value(&self) -> Value<'_> {
        self.as_slice().value()
    }

    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl<T: Pickable> Pickable for VecDeque<T> {
    fn value(&self) -> Value<'_> {
        Value::Sequence(self.iter().map(|v| v as &dyn Pickable).collect())
    }

    fn is_empty(&self) -> bool {
        VecDeque::is_empty(self)
    }
}

// ── Derive support ──────────────────────────────────────────

/// Zero check over a field of any type, used by `#[derive(Record)]` to cover
/// fields it does not expose.
///
/// `(&ZeroCheck(&field)).is_zero()` picks [`PickableZero`] when the field is
/// [`Pickable`] and falls back to [`OpaqueZero`] otherwise. A field the
/// library cannot inspect never counts as zero, so its record is kept.
#[doc(hidden)]
pub struct ZeroCheck<'a, T: ?Sized>(pub &'a T);

#[doc(hidden)]
pub trait PickableZero {
    fn is_zero(&self) -> bool;
}

impl<T: Pickable + ?Sized> PickableZero for ZeroCheck<'_, T> {
    fn is_zero(&self) -> bool {
        Pickable::is_empty(self.0)
    }
}

#[doc(hidden)]
pub trait OpaqueZero {
    fn is_zero(&self) -> bool;
}

impl<T: ?Sized> OpaqueZero for &ZeroCheck<'_, T> {
    fn is_zero(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use bson::{bson, doc};

    use super::*;
    use crate::record::Field;

    struct Point {
        x: i32,
        y: i32,
    }

    impl Record for Point {
        fn fields(&self) -> Vec<Field<'_>> {
            vec![Field::new("x", &self.x), Field::new("y", &self.y)]
        }
    }

    impl Pickable for Point {
        fn value(&self) -> Value<'_> {
            Value::Record(self)
        }
    }

    fn empty<T: Pickable + ?Sized>(value: &T) -> bool {
        value.is_empty()
    }

    #[test]
    fn scalar_zero_values_are_empty() {
        assert!(empty(&false));
        assert!(empty(&0i32));
        assert!(empty(&0u64));
        assert!(empty(&0.0f64));
        assert!(empty(&'\0'));
        assert!(empty(""));
        assert!(empty(&String::new()));
        assert!(empty(&Bson::Null));
        assert!(empty(&Document::new()));

        assert!(!empty(&true));
        assert!(!empty(&-1i64));
        assert!(!empty("x"));
        assert!(!empty(&'a'));
        assert!(!empty(&DateTime::from_millis(0)));
        assert!(!empty(&Bson::Int32(7)));
    }

    #[test]
    fn borrowed_checks_agree_with_snapshots() {
        let values: Vec<Box<dyn Pickable>> = vec![
            Box::new(String::new()),
            Box::new("x".to_string()),
            Box::new(Document::new()),
            Box::new(doc! { "a": 1 }),
            Box::new(HashMap::<String, i32>::new()),
            Box::new(BTreeMap::from([("a".to_string(), 0)])),
            Box::new(Bson::Array(vec![])),
        ];
        for value in &values {
            assert_eq!(value.is_empty(), value.value().is_empty(), "{:?}", value.value());
        }
    }

    #[test]
    fn maps_are_empty_by_length() {
        assert!(empty(&HashMap::<String, i32>::new()));
        assert!(!empty(&HashMap::from([("a".to_string(), 0)])));
        assert!(empty(&BTreeMap::<String, String>::new()));
    }

    #[test]
    fn optional_is_empty_only_when_absent() {
        assert!(empty(&None::<i32>));
        assert!(!empty(&Some(0)));
        assert!(!empty(&Some(String::new())));
        assert!(None::<i32>.value().is_empty());
        assert!(!Some(0).value().is_empty());
    }

    #[test]
    fn sequences_are_empty_by_length() {
        assert!(empty(&Vec::<String>::new()));
        assert!(!empty(&vec![String::new()]));
        assert!(empty(&([] as [i32; 0])));
        assert!(!empty(&[0]));
        assert!(empty(&VecDeque::<i32>::new()));
        assert!(Vec::<String>::new().value().is_empty());
    }

    #[test]
    fn indirection_forwards_the_zero_check() {
        assert!(empty(&&0i32));
        assert!(empty(&Box::new(String::new())));
        assert!(empty(&Rc::new('\0')));
        assert!(!empty(&Arc::new(1u8)));
    }

    #[test]
    fn record_is_empty_when_every_field_is() {
        assert!(empty(&Point { x: 0, y: 0 }));
        assert!(!empty(&Point { x: 0, y: 3 }));
        assert!(Point { x: 0, y: 0 }.value().is_empty());
    }

    #[test]
    fn zero_check_falls_back_for_opaque_fields() {
        struct Opaque;
        assert!((&ZeroCheck(&0i32)).is_zero());
        assert!(!(&ZeroCheck(&5i32)).is_zero());
        assert!((&ZeroCheck("")).is_zero());
        assert!(!(&ZeroCheck(&Opaque)).is_zero());
    }

    #[test]
    fn indirection_is_transparent() {
        let point = Point { x: 1, y: 2 };
        let boxed = Box::new(Point { x: 1, y: 2 });
        let shared = Arc::new(Point { x: 1, y: 2 });
        assert!((&point).value().as_record().is_some());
        assert_eq!(boxed.value().to_bson(), point.value().to_bson());
        assert_eq!(shared.value().to_bson(), point.value().to_bson());
        assert!(Some(point).value().as_record().is_some());
        assert!(None::<Point>.value().as_record().is_none());
    }

    #[test]
    fn to_bson_materializes_nested_values() {
        let points = vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }];
        assert_eq!(
            points.value().to_bson(),
            bson!([{ "x": 1, "y": 2 }, { "x": 3, "y": 4 }])
        );

        let tags = BTreeMap::from([("a".to_string(), 1u8), ("b".to_string(), 2u8)]);
        assert_eq!(tags.value().to_bson(), Bson::Document(doc! { "a": 1, "b": 2 }));
        assert_eq!(None::<Point>.value().to_bson(), Bson::Null);
        assert_eq!(u64::MAX.value().to_bson(), Bson::Double(u64::MAX as f64));
    }

    #[test]
    fn serializes_like_bson() {
        let point = Some(Point { x: 1, y: 0 });
        let json = serde_json::to_value(point.value()).unwrap();
        assert_eq!(json, serde_json::json!({ "x": 1, "y": 0 }));
        let json = serde_json::to_value(None::<Point>.value()).unwrap();
        assert_eq!(json, serde_json::Value::Null);
    }
}
