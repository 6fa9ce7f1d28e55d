//! JSON decoding and key lookups for API responses.

use serde_json::Value;

use crate::error_handling::{ErrorType, ProcessingStats};
use crate::record::FieldValue;

/// Decodes a response body, logging and counting invalid JSON.
///
/// # Arguments
///
/// * `body` - Raw response text
/// * `context` - What the body came from, for the log line
/// * `stats` - Receives an `InvalidJson` error on failure
pub fn decode_json(body: &str, context: &str, stats: &ProcessingStats) -> Option<Value> {
    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("Invalid JSON response from {context}: {e}");
            stats.increment_error(ErrorType::InvalidJson);
            None
        }
    }
}

/// Field `key` of a JSON object as a cell value, or `None` if the key is absent.
///
/// A key that is present with a `null` value yields `FieldValue::Empty`.
pub fn json_field(value: &Value, key: &str) -> Option<FieldValue> {
    value.get(key).map(FieldValue::from)
}

/// Field `key` rendered as text, for ids and lookup keys.
///
/// Numbers are stringified; `null` and missing keys yield `None`.
pub fn json_key_text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
