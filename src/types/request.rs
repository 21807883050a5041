use bon::Builder;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::Result;
use crate::error::Error;

/// A free-form JSON object: event properties, a customer record, or a customer update.
pub type Properties = Map<String, Value>;

/// Wire name of the session identifier in every request body.
pub(crate) const SESSION_ID_FIELD: &str = "sessionId";

/// Request to record a tracked event.
///
/// The session identifier attached to the event is resolved in this order:
/// 1. `session_id` on this request
/// 2. the identifier stored on the client by [`crate::client::Customers::login`]
/// 3. a string `sessionId` entry in `properties`, which is moved out of the properties
///
/// # Example
///
/// ```
/// use hypothesis_client_sdk::types::TrackRequest;
/// use serde_json::json;
///
/// let request = TrackRequest::builder()
///     .key("checkout.completed")
///     .properties(json!({ "total": 42 }).as_object().cloned().unwrap_or_default())
///     .build();
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct TrackRequest {
    /// Name of the event.
    #[builder(into)]
    pub key: String,
    /// Explicit session identifier, takes precedence over the one stored on the client.
    #[builder(into)]
    pub session_id: Option<String>,
    /// Additional event properties, attached verbatim.
    pub properties: Option<Properties>,
}

impl TrackRequest {
    /// Validates the request and resolves the body sent to `POST /behavior`.
    pub(crate) fn into_body(self, stored_session_id: Option<String>) -> Result<TrackBody> {
        if self.key.trim().is_empty() {
            return Err(Error::validation("Must pass a key to track."));
        }

        let mut properties = self.properties;
        let session_id = match self
            .session_id
            .filter(|id| !id.is_empty())
            .or(stored_session_id)
        {
            Some(id) => Some(id),
            None => {
                let promoted = properties.as_mut().and_then(take_session_id);
                // Only a map emptied by the promotion is dropped, a caller's `{}` is sent as is.
                if promoted.is_some() {
                    properties = properties.filter(|properties| !properties.is_empty());
                }
                promoted
            }
        };

        Ok(TrackBody {
            key: self.key,
            session_id,
            properties,
        })
    }
}

/// Removes a non-empty string `sessionId` from `properties` and returns it.
fn take_session_id(properties: &mut Properties) -> Option<String> {
    match properties.get(SESSION_ID_FIELD) {
        Some(Value::String(id)) if !id.is_empty() => {}
        _ => return None,
    }

    match properties.remove(SESSION_ID_FIELD) {
        Some(Value::String(id)) => Some(id),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrackBody {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

/// Body of the login and logout calls.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionBody<'id> {
    pub session_id: &'id str,
}

/// Request to create many customers in one call.
///
/// # Example
///
/// ```
/// use hypothesis_client_sdk::types::BulkCreateRequest;
/// use serde_json::json;
///
/// let request = BulkCreateRequest::builder()
///     .items(vec![
///         json!({ "emailAddress": "ada@example.com" }),
///         json!({ "emailAddress": "grace@example.com" }),
///     ])
///     .build();
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Builder)]
pub struct BulkCreateRequest {
    /// Customer records, created in order.
    pub items: Vec<Value>,
}

impl BulkCreateRequest {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(Error::validation("Must pass an array of customers."));
        }

        if let Some(index) = self.items.iter().position(|item| !item.is_object()) {
            return Err(Error::validation(format!(
                "Customer at index {index} must be a JSON object."
            )));
        }

        Ok(())
    }
}

/// Serializes a caller-supplied record and requires it to be a JSON object. `null` (including a
/// `None` passed through) is treated as a missing argument and reported with `missing`.
pub(crate) fn to_object<T: Serialize + ?Sized>(value: &T, missing: &str) -> Result<Properties> {
    match serde_json::to_value(value)? {
        Value::Object(object) => Ok(object),
        Value::Null => Err(Error::validation(missing)),
        other => Err(Error::validation(format!(
            "{missing} Expected a JSON object, got {other}."
        ))),
    }
}
