//! Response body decoding.
//!
//! When the `tracing` feature is enabled, unknown fields in a response envelope are logged as
//! warnings and decode failures are logged with the JSON path that failed, helping detect API
//! changes.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::response::{Envelope, ErrorDetail};

/// Deserialize JSON, warning about fields the target type does not capture.
#[cfg(feature = "tracing")]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    use std::any::type_name;

    tracing::trace!(type_name = %type_name::<T>(), json = %value, "deserializing JSON");

    let original = value.clone();
    let mut unknown_paths: Vec<String> = Vec::new();

    let result: T = serde_ignored::deserialize(value, |path| {
        unknown_paths.push(path.to_string());
    })
    .inspect_err(|_| {
        let path_result: Result<T, _> = serde_path_to_error::deserialize(&original);
        if let Err(path_err) = path_result {
            tracing::error!(
                type_name = %type_name::<T>(),
                path = %path_err.path(),
                error = %path_err.inner(),
                "deserialization failed"
            );
        }
    })?;

    for path in unknown_paths {
        tracing::warn!(
            type_name = %type_name::<T>(),
            field = %path,
            "unknown field in API response"
        );
    }

    Ok(result)
}

/// Pass-through deserialization when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Extract the payload of a successful response. An empty body, a body that is not a JSON object,
/// or a missing/null `data` field yields `None`.
pub fn decode_payload<T: DeserializeOwned>(body: &str) -> crate::Result<Option<T>> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(body) else {
        #[cfg(feature = "tracing")]
        tracing::warn!(body = %body, "successful response without a data envelope");
        return Ok(None);
    };
    let envelope: Envelope<T> = deserialize_with_warnings(value)?;

    Ok(envelope.data)
}

/// Best-effort read of the `{ "data": { "error", "validationErrors" } }` failure body. Bodies
/// that do not have that shape yield `None` so the caller can fall back to the raw text.
pub fn decode_error_detail(body: &str) -> Option<ErrorDetail> {
    serde_json::from_str::<Envelope<ErrorDetail>>(body)
        .ok()
        .and_then(|envelope| envelope.data)
}
