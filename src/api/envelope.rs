//! Response envelope normalization.
//!
//! The server answers either `{"data": T}` or a bare `T` depending on the
//! endpoint. Everything downstream of the gateway only ever sees `T`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::ApiError;

/// Strips a `{"data": ...}` wrapper if present. A `null` data field is treated
/// as absent, so the outer object is returned unchanged.
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner) if !inner.is_null() => inner,
            Some(inner) => {
                map.insert("data".to_string(), inner);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Normalizes then deserializes into the caller's type.
pub fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(unwrap_data(value))
        .map_err(|e| ApiError::Decode { endpoint: endpoint.to_string(), message: e.to_string() })
}

/// Like [`decode`], but `null`, an empty body or `{"data": null}` fall back to
/// `T::default()`.
pub fn decode_or_default<T: DeserializeOwned + Default>(
    endpoint: &str,
    value: Value,
) -> Result<T, ApiError> {
    match unwrap_data(value) {
        Value::Null => Ok(T::default()),
        Value::Object(map) if map.len() == 1 && map.get("data").is_some_and(Value::is_null) => {
            Ok(T::default())
        }
        other => decode(endpoint, other),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq, Default)]
    #[serde(rename_all = "camelCase")]
    struct Due {
        total_due: u32,
    }

    #[test]
    fn wrapped_and_bare_decode_the_same() {
        let wrapped: Due = decode("/x", json!({ "data": { "totalDue": 3 } })).unwrap();
        let bare: Due = decode("/x", json!({ "totalDue": 3 })).unwrap();
        assert_eq!(wrapped, bare);
    }

    #[test]
    fn wrapped_arrays_unwrap() {
        let ids: Vec<u32> = decode("/x", json!({ "data": [1, 2, 3] })).unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn null_data_keeps_outer_object() {
        let value = unwrap_data(json!({ "data": null, "totalDue": 1 }));
        assert_eq!(value, json!({ "data": null, "totalDue": 1 }));
    }

    #[test]
    fn null_body_defaults() {
        let due: Due = decode_or_default("/x", Value::Null).unwrap();
        assert_eq!(due, Due::default());

        let cards: Vec<Due> = decode_or_default("/x", json!({ "data": null })).unwrap();
        assert!(cards.is_empty());
    }

    #[test]
    fn shape_mismatch_is_decode_error() {
        let err = decode::<Due>("/srs/alarm", json!({ "data": "oops" })).unwrap_err();
        assert!(matches!(err, ApiError::Decode { ref endpoint, .. } if endpoint == "/srs/alarm"));
    }
}
