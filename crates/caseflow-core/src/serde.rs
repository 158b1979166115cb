//! Lenient serde helpers for loosely-typed inputs.
//!
//! Tokens minted by older clients carry `user_type` and `center_id` either as
//! JSON numbers or as numeric strings (`"3"`). Both are accepted; anything
//! that is not an integer resolves to `None`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads an `i32` out of a JSON number or numeric string.
///
/// Numbers are truncated toward zero (`7.9` gives 7). Strings are trimmed and
/// must then hold a whole integer: `" 12 "` gives 12, while `"3abc"` and
/// `"7.9"` give `None`. Anything else, or a value outside `i32`, is `None`.
pub fn coerce_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

pub fn deserialize_lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_lenient_i32")]
        value: Option<i32>,
    }

    #[test]
    fn test_coerce_numbers_and_strings() {
        assert_eq!(coerce_i32(&json!(7)), Some(7));
        assert_eq!(coerce_i32(&json!(7.9)), Some(7));
        assert_eq!(coerce_i32(&json!(" 12 ")), Some(12));
        assert_eq!(coerce_i32(&json!("twelve")), None);
        assert_eq!(coerce_i32(&json!(null)), None);
        assert_eq!(coerce_i32(&json!(true)), None);
        assert_eq!(coerce_i32(&json!(10_000_000_000i64)), None);
    }

    #[test]
    fn test_deserialize_lenient_field() {
        let h: Holder = serde_json::from_str(r#"{"value":"4"}"#).unwrap();
        assert_eq!(h.value, Some(4));
        let h: Holder = serde_json::from_str(r#"{"value":"abc"}"#).unwrap();
        assert_eq!(h.value, None);
        let h: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(h.value, None);
    }

    #[test]
    fn test_strings_must_be_whole_integers() {
        assert_eq!(coerce_i32(&json!(7.9)), Some(7));
        assert_eq!(coerce_i32(&json!(" 12 ")), Some(12));
        assert_eq!(coerce_i32(&json!("3abc")), None);
        assert_eq!(coerce_i32(&json!("7.9")), None);
        assert_eq!(coerce_i32(&json!(5_000_000_000i64)), None);
    }
}
