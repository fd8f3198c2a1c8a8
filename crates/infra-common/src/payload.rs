//! Flattening of nested event payloads
//!
//! Events arrive as arbitrary JSON. Consumers never walk that structure; they flatten it once
//! into a [`FlattenedEvent`] and probe it by path. Object keys are joined with `.`, list
//! indices are rendered as `[i]`:
//!
//! ```text
//! {"crm_result": {"lead": {"lead": {"id": "L1"}}}, "tags": ["a", "b"]}
//!
//! crm_result.lead.lead.id = "L1"
//! tags[0]                 = "a"
//! tags[1]                 = "b"
//! ```
//!
//! Input is assumed to be acyclic JSON-like data; no depth limit is enforced.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Single-level view of a nested payload, keyed by structural path.
///
/// Every leaf of the source appears exactly once. Values are always scalars (string, number,
/// boolean or null).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlattenedEvent {
    fields: BTreeMap<String, Value>,
}

/// Flatten `value` with an empty path prefix
pub fn flatten(value: &Value) -> FlattenedEvent {
    flatten_with_prefix(value, "")
}

/// Flatten `value`, prefixing every produced path with `prefix`
pub fn flatten_with_prefix(value: &Value, prefix: &str) -> FlattenedEvent {
    let mut fields = BTreeMap::new();
    flatten_into(value, prefix.to_string(), &mut fields);
    FlattenedEvent { fields }
}

fn flatten_into(value: &Value, path: String, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                flatten_into(child, child_path, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, format!("{}[{}]", path, index), out);
            }
        }
        scalar => {
            out.insert(path, scalar.clone());
        }
    }
}

/// Whether a value counts as present when resolving aliases.
///
/// Null, empty strings, `false` and numeric zero are all treated as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

impl FlattenedEvent {
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(path, value)` pairs in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// First value among `paths` that is present, probing in the given order
    pub fn first_present(&self, paths: &[&str]) -> Option<&Value> {
        paths
            .iter()
            .filter_map(|path| self.fields.get(*path))
            .find(|value| is_present(value))
    }

    /// Like [`first_present`](Self::first_present), rendered as text
    pub fn first_present_string(&self, paths: &[&str]) -> Option<String> {
        self.first_present(paths).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}
