//! Nested query-string encoding for EspoCRM list filters
//!
//! EspoCRM reads filters in the PHP `http_build_query` layout:
//!
//! ```text
//! {"where": [{"type": "equals", "attribute": "phoneNumber", "value": "+380501112233"}]}
//!
//! where[0][attribute]=phoneNumber
//! where[0][type]=equals
//! where[0][value]=+380501112233
//! ```
//!
//! The first object key is written bare; every deeper key and every list index is bracketed.

use serde::Serialize;
use serde_json::{json, Value};

enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

/// Encode `params` into `(key, value)` pairs; percent-encoding is left to the HTTP client.
///
/// Strings are written raw, numbers and booleans in their JSON spelling, null as an empty
/// string.
pub fn encode_query(params: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut parents = Vec::new();
    encode(params, &mut parents, &mut pairs);
    pairs
}

fn encode<'a>(value: &'a Value, parents: &mut Vec<Segment<'a>>, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                parents.push(Segment::Index(index));
                encode(item, parents, pairs);
                parents.pop();
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                parents.push(Segment::Key(key));
                encode(item, parents, pairs);
                parents.pop();
            }
        }
        Value::String(s) => pairs.push((render_key(parents), s.clone())),
        Value::Null => pairs.push((render_key(parents), String::new())),
        other => pairs.push((render_key(parents), other.to_string())),
    }
}

fn render_key(parents: &[Segment<'_>]) -> String {
    let mut out = String::new();
    for (depth, segment) in parents.iter().enumerate() {
        match segment {
            Segment::Key(key) if depth == 0 => out.push_str(key),
            Segment::Key(key) => {
                out.push('[');
                out.push_str(key);
                out.push(']');
            }
            Segment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}

/// One EspoCRM `where` filter item
#[derive(Debug, Clone, Serialize)]
pub struct WhereClause {
    #[serde(rename = "type")]
    pub kind: String,
    pub attribute: String,
    pub value: Value,
}

impl WhereClause {
    /// Exact-match filter on `attribute`
    pub fn equals(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            kind: "equals".to_string(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// List-query parameters for a set of `where` clauses
pub fn where_query(clauses: &[WhereClause]) -> Value {
    json!({ "where": clauses })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clause_layout() {
        let params = where_query(&[WhereClause::equals("phoneNumber", "+380501112233")]);
        let mut pairs = encode_query(&params);
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("where[0][attribute]".to_string(), "phoneNumber".to_string()),
                ("where[0][type]".to_string(), "equals".to_string()),
                ("where[0][value]".to_string(), "+380501112233".to_string()),
            ]
        );
    }

    #[test]
    fn test_prebracketed_flat_keys_pass_through() {
        let pairs = encode_query(&json!({"where[0][type]": "equals", "maxSize": 20}));
        assert!(pairs.contains(&("where[0][type]".to_string(), "equals".to_string())));
        assert!(pairs.contains(&("maxSize".to_string(), "20".to_string())));
    }

    #[test]
    fn test_scalars_and_nested_lists() {
        let pairs = encode_query(&json!({
            "select": ["id", "name"],
            "deleted": false,
            "note": null,
            "order": {"by": [{"field": "createdAt"}]}
        }));
        assert!(pairs.contains(&("select[0]".to_string(), "id".to_string())));
        assert!(pairs.contains(&("select[1]".to_string(), "name".to_string())));
        assert!(pairs.contains(&("deleted".to_string(), "false".to_string())));
        assert!(pairs.contains(&("note".to_string(), String::new())));
        assert!(pairs.contains(&("order[by][0][field]".to_string(), "createdAt".to_string())));
    }

    #[test]
    fn test_empty_params() {
        assert!(encode_query(&json!({})).is_empty());
    }
}
