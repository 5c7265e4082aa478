//! Dotted-path helpers for schemaless JSON documents.
//!
//! Patches address nested fields as `json.verification`; intermediate objects
//! are created on demand and non-object intermediates are replaced.

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// Read the value at a dotted path.
///
/// # Examples
/// ```
/// use dealroom::domain::json_path::lookup;
/// use serde_json::json;
///
/// let data = json!({"json": {"score": {"overall": 7.1}}});
/// let map = data.as_object().expect("object");
/// assert_eq!(lookup(map, "json.score.overall"), Some(&json!(7.1)));
/// assert_eq!(lookup(map, "json.missing"), None);
/// ```
pub fn lookup<'a>(data: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    segments.try_fold(data.get(first)?, |value, segment| value.get(segment))
}

/// Write `value` at a dotted path.
pub fn assign(data: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = data;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_owned(), value);
            return;
        }
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
}

/// Merge every `(path, value)` pair of `patch` into `target`.
pub fn apply_patch(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (path, value) in patch {
        assign(target, &path, value);
    }
}

/// Order two JSON scalars of the same type.
///
/// Values of different types are incomparable and yield `None`.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}
