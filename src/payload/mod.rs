//! Request payload decoding.
//!
//! # Data Flow
//! ```text
//! POST body bytes
//!     → regular endpoint: content-type must declare JSON → strict parse
//!     → repair endpoint:  strict parse → repair.rs fallback
//!     → serde_json::Value forwarded upstream
//! ```

pub mod repair;

use axum::http::{header, HeaderMap};
use serde_json::Value;

pub use repair::{attempt_repair, RepairError};

/// True when the request declares a JSON body
/// (`application/json` or any `application/*+json`).
pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Strictly parse a body that declared itself JSON.
pub fn decode_strict(body: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Outcome of lenient decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Value,
    /// Whether the repair heuristic produced the value.
    pub repaired: bool,
}

/// Parse raw text, falling back to [`attempt_repair`].
///
/// A strict parse that only yields a bare JSON string is treated as a
/// double-encoded document and also goes through repair. The repaired value
/// is kept only when it is an object or array; otherwise the string itself
/// is forwarded.
pub fn decode_lenient(raw: &str) -> Result<Decoded, RepairError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(inner)) => match attempt_repair(raw) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => Ok(Decoded {
                value,
                repaired: true,
            }),
            _ => Ok(Decoded {
                value: Value::String(inner),
                repaired: false,
            }),
        },
        Ok(value) => Ok(Decoded {
            value,
            repaired: false,
        }),
        Err(_) => attempt_repair(raw).map(|value| Decoded {
            value,
            repaired: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn with_content_type(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn json_content_types() {
        assert!(is_json_content_type(&with_content_type("application/json")));
        assert!(is_json_content_type(&with_content_type("Application/JSON; charset=utf-8")));
        assert!(is_json_content_type(&with_content_type("application/vnd.api+json")));
        assert!(!is_json_content_type(&with_content_type("text/plain")));
        assert!(!is_json_content_type(&with_content_type("application/x-www-form-urlencoded")));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }

    #[test]
    fn lenient_accepts_valid_json_untouched() {
        let decoded = decode_lenient(r#"{"channel":"C1","text":"hi"}"#).unwrap();
        assert_eq!(decoded.value, json!({"channel": "C1", "text": "hi"}));
        assert!(!decoded.repaired);
    }

    #[test]
    fn lenient_unwraps_double_encoded_document() {
        let decoded = decode_lenient(r#""{\"text\":\"hi\"}""#).unwrap();
        assert_eq!(decoded.value, json!({"text": "hi"}));
        assert!(decoded.repaired);
    }

    #[test]
    fn lenient_keeps_scalar_looking_strings() {
        for (raw, expected) in [
            (r#""123""#, json!("123")),
            (r#""true""#, json!("true")),
            (r#""null""#, json!("null")),
            (r#""\"quoted\"""#, json!("\"quoted\"")),
        ] {
            let decoded = decode_lenient(raw).unwrap();
            assert_eq!(decoded.value, expected, "{raw}");
            assert!(!decoded.repaired, "{raw}");
        }
    }

    #[test]
    fn lenient_unwraps_double_encoded_array() {
        let decoded = decode_lenient(r#""[{\"type\":\"divider\"}]""#).unwrap();
        assert_eq!(decoded.value, json!([{"type": "divider"}]));
        assert!(decoded.repaired);
    }

    #[test]
    fn lenient_keeps_plain_json_string() {
        let decoded = decode_lenient(r#""just words""#).unwrap();
        assert_eq!(decoded.value, json!("just words"));
        assert!(!decoded.repaired);
    }

    #[test]
    fn lenient_fails_on_garbage() {
        assert!(decode_lenient("{not json at all").is_err());
        assert!(decode_lenient("").is_err());
    }
}
