use serde_json::{Map, Value};

/// A record as returned by the Slack API: an ordered mapping of field names
/// to JSON values, possibly nested.
pub type Record = Map<String, Value>;

/// Flattens a nested record into a single-level one, joining key paths with
/// `.`: `{a: 1, b: {c: 2, d: {e: 3}}}` becomes `{a: 1, "b.c": 2, "b.d.e": 3}`.
///
/// Only plain objects are unwrapped; arrays are kept as opaque values under
/// their own key. A key whose value is an empty object contributes no entries
/// and disappears from the output entirely; kept that way on purpose, existing
/// sheets rely on it. Input must be acyclic (parsed JSON always is).
pub fn flatten(record: &Record) -> Record {
    let mut flat = Record::new();

    for (key, value) in record {
        match value {
            Value::Object(nested) => {
                for (nested_key, nested_value) in flatten(nested) {
                    flat.insert(format!("{}.{}", key, nested_key), nested_value);
                }
            }
            other => {
                flat.insert(key.clone(), other.clone());
            }
        }
    }

    flat
}
