//! Text encoding of message values for the storage provider.

use serde_json::Value;
use tracing::debug;

/// Encode a value for storage. Strings are stored verbatim, everything else
/// as JSON.
pub fn encode(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Decode a stored value. Anything that is not valid JSON comes back as the
/// raw string.
pub fn decode(raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Stored value is not JSON, keeping raw string");
            Value::String(raw.to_string())
        }
    }
}
