//! Flattening of nested context data into path-keyed lookups.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Single-level view of nested data, keyed by underscore-joined paths.
pub type FlattenedContext<'a> = BTreeMap<String, &'a Value>;

/// Objects nested deeper than this are emitted as leaves.
pub const MAX_FLATTEN_DEPTH: usize = 64;

/// Flatten `obj` so that `{"project": {"name": "demo"}}` becomes
/// `{"project_name": "demo"}`.
///
/// Only objects are descended into. Arrays, null and scalars are leaves.
/// When two paths collide the one visited last wins.
pub fn flatten(obj: &Map<String, Value>) -> FlattenedContext<'_> {
    let mut flattened = BTreeMap::new();
    flatten_into(obj, "", 0, &mut flattened);
    flattened
}

fn flatten_into<'a>(
    obj: &'a Map<String, Value>,
    prefix: &str,
    depth: usize,
    out: &mut FlattenedContext<'a>,
) {
    for (key, value) in obj {
        let path = format!("{prefix}{key}");
        match value {
            Value::Object(nested) if depth < MAX_FLATTEN_DEPTH => {
                flatten_into(nested, &format!("{path}_"), depth + 1, out);
            }
            _ => {
                out.insert(path, value);
            }
        }
    }
}
