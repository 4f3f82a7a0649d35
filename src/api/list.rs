//! Collection responses.
//!
//! List endpoints answer either with a paginated envelope
//! (`{results, count, next, previous}`) or with a bare JSON array, depending
//! on server configuration. Any other shape reads as an empty list.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub fn decode_list<T: DeserializeOwned>(body: Option<Value>) -> serde_json::Result<Vec<T>> {
    match body {
        Some(Value::Object(mut envelope)) => match envelope.remove("results") {
            Some(results @ Value::Array(_)) => {
                if let Some(next) = envelope.get("next").and_then(Value::as_str) {
                    debug!(next, "list response has further pages that are not fetched");
                }
                serde_json::from_value(results)
            }
            _ => Ok(Vec::new()),
        },
        Some(items @ Value::Array(_)) => serde_json::from_value(items),
        _ => Ok(Vec::new()),
    }
}
