use std::collections::HashMap;

use tracing::trace;

use crate::field_tree::FieldTree;
use crate::projection::{FieldMap, Projection};
use crate::record::{self, Record};
use crate::value::{Pickable, Value};

/// Apply a prebuilt [`FieldTree`] to a value.
///
/// A [`FieldTree::Leaf`] hands the value back whole. A branch keeps the
/// selected fields of records, maps sequences element by element, looks
/// through optionals, and passes anything else through unchanged.
pub fn project<'a>(value: &'a dyn Pickable, tree: &FieldTree<'_>) -> Projection<'a> {
    let FieldTree::Branch(children) = tree else {
        return Projection::Whole(value);
    };

    match value.value() {
        Value::Record(record) => Projection::Record(project_record(record, children)),
        Value::Sequence(items) => Projection::Sequence(
            items.into_iter().map(|item| project(item, tree)).collect(),
        ),
        Value::Optional(Some(inner)) => project(inner, tree),
        Value::Optional(None) => Projection::Whole(value),
        Value::Scalar(_) => {
            trace!("field selection applied to a scalar, passing through");
            Projection::Whole(value)
        }
    }
}

fn project_record<'a>(record: &'a dyn Record, tree: &HashMap<&str, FieldTree<'_>>) -> FieldMap<'a> {
    let mut out = FieldMap::new();
    for entry in record::entries(record) {
        if let Some(subtree) = tree.get(entry.name) {
            out.insert(entry.name, project(entry.value, subtree));
        }
    }
    out
}
