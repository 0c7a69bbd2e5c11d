use serde_json::Value;

/// Recursively rewrites a JSON value so every leaf is a string, preserving
/// container shape.
///
/// Downstream handlers assume string-only leaves; a payload with numbers,
/// booleans, or nulls where strings are expected must not fail at the
/// boundary. Total over all JSON values:
///
/// - `null` becomes the empty string
/// - strings pass through unchanged
/// - numbers and booleans become their canonical string form
/// - arrays keep their length and order; objects keep their key set and
///   insertion order (serde_json is built with `preserve_order`)
///
/// Idempotent: a second pass over the output is a no-op.
pub fn coerce_to_strings(value: Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        Value::String(s) => Value::String(s),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_to_strings).collect()),
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key, coerce_to_strings(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_leaves() {
        assert_eq!(coerce_to_strings(json!(null)), json!(""));
        assert_eq!(coerce_to_strings(json!("x")), json!("x"));
        assert_eq!(coerce_to_strings(json!(true)), json!("true"));
        assert_eq!(coerce_to_strings(json!(false)), json!("false"));
        assert_eq!(coerce_to_strings(json!(1)), json!("1"));
        assert_eq!(coerce_to_strings(json!(-2.5)), json!("-2.5"));
    }

    #[test]
    fn test_mixed_payload() {
        let coerced = coerce_to_strings(json!({"a": 1, "b": null, "c": [true, "x"]}));
        assert_eq!(coerced, json!({"a": "1", "b": "", "c": ["true", "x"]}));
    }

    #[test]
    fn test_nested_shape_is_preserved() {
        let input = json!({
            "record": {"id": 42, "tags": [null, {"weight": 0.5}]},
            "flags": [],
        });
        let coerced = coerce_to_strings(input);
        assert_eq!(
            coerced,
            json!({
                "record": {"id": "42", "tags": ["", {"weight": "0.5"}]},
                "flags": [],
            })
        );
    }

    #[test]
    fn test_key_order_is_preserved() {
        let input: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let coerced = coerce_to_strings(input);
        assert_eq!(
            serde_json::to_string(&coerced).unwrap(),
            r#"{"z":"1","a":"2","m":"3"}"#
        );
    }

    #[test]
    fn test_idempotent() {
        let once = coerce_to_strings(json!({"a": 1, "b": [null, false], "c": {"d": 2}}));
        let twice = coerce_to_strings(once.clone());
        assert_eq!(once, twice);
    }
}
