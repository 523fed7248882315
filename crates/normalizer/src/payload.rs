//! Top-level payload shape classification.
//!
//! Raw documents are classified before any record is decoded so that an
//! absent document, an empty one and a malformed one stay distinguishable.

use serde_json::Value;

/// Field under which provider B wraps its position list.
pub const PROVIDER_B_DATA_FIELD: &str = "data";

/// Top-level shape of a raw provider document.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadShape<'a> {
    /// The document is JSON `null`.
    Absent,
    /// A well-formed but empty record list.
    Empty,
    /// The document has an unexpected top-level shape.
    Malformed(String),
    /// Records to decode.
    Records(&'a [Value]),
}

impl<'a> PayloadShape<'a> {
    /// Classify a provider-A document, which must be a bare array.
    pub fn provider_a(raw: &'a Value) -> Self {
        match raw {
            Value::Null => PayloadShape::Absent,
            Value::Array(items) => Self::from_items(items),
            other => PayloadShape::Malformed(format!(
                "expected an array of protocols, found {}",
                kind(other)
            )),
        }
    }

    /// Classify a provider-B document: a bare array or `{ "data": [...] }`.
    pub fn provider_b(raw: &'a Value) -> Self {
        match raw {
            Value::Null => PayloadShape::Absent,
            Value::Array(items) => Self::from_items(items),
            Value::Object(map) => match map.get(PROVIDER_B_DATA_FIELD) {
                Some(Value::Array(items)) => Self::from_items(items),
                Some(Value::Null) => PayloadShape::Absent,
                Some(other) => PayloadShape::Malformed(format!(
                    "expected '{PROVIDER_B_DATA_FIELD}' to be an array, found {}",
                    kind(other)
                )),
                None => PayloadShape::Malformed(format!(
                    "object without a '{PROVIDER_B_DATA_FIELD}' field"
                )),
            },
            other => PayloadShape::Malformed(format!(
                "expected an array of positions, found {}",
                kind(other)
            )),
        }
    }

    /// Records to decode; empty for every other shape.
    pub fn records(&self) -> &'a [Value] {
        match self {
            PayloadShape::Records(items) => *items,
            _ => &[],
        }
    }

    /// Whether the document was malformed.
    pub fn is_malformed(&self) -> bool {
        matches!(self, PayloadShape::Malformed(_))
    }

    fn from_items(items: &'a [Value]) -> Self {
        if items.is_empty() {
            PayloadShape::Empty
        } else {
            PayloadShape::Records(items)
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_a_shapes() {
        assert_eq!(PayloadShape::provider_a(&json!(null)), PayloadShape::Absent);
        assert_eq!(PayloadShape::provider_a(&json!([])), PayloadShape::Empty);
        assert!(PayloadShape::provider_a(&json!({"data": []})).is_malformed());
        assert!(PayloadShape::provider_a(&json!("oops")).is_malformed());

        let raw = json!([{"name": "Aave V3"}]);
        assert_eq!(PayloadShape::provider_a(&raw).records().len(), 1);
    }

    #[test]
    fn test_provider_b_accepts_both_shapes() {
        let bare = json!([{"id": "a"}, {"id": "b"}]);
        assert_eq!(PayloadShape::provider_b(&bare).records().len(), 2);

        let wrapped = json!({"data": [{"id": "a"}], "meta": {"status": "ok"}});
        assert_eq!(PayloadShape::provider_b(&wrapped).records().len(), 1);
    }

    #[test]
    fn test_provider_b_shapes() {
        assert_eq!(PayloadShape::provider_b(&json!(null)), PayloadShape::Absent);
        assert_eq!(PayloadShape::provider_b(&json!({"data": null})), PayloadShape::Absent);
        assert_eq!(PayloadShape::provider_b(&json!({"data": []})), PayloadShape::Empty);
        assert!(PayloadShape::provider_b(&json!({"data": {}})).is_malformed());
        assert!(PayloadShape::provider_b(&json!({"errors": []})).is_malformed());
        assert!(PayloadShape::provider_b(&json!(12)).is_malformed());
        assert!(PayloadShape::provider_b(&json!(12)).records().is_empty());
    }
}
