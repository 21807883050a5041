use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The payload found under `data` in a successful response. Its shape is endpoint specific and
/// is passed through untouched.
pub type Payload = Value;

/// Every response body is wrapped as `{ "data": ... }`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Option<T>,
}

/// The `data` field of a failed response.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    /// Human-readable reason supplied by the server.
    pub error: Option<String>,
    /// Field level detail, present when the server rejected the body.
    pub validation_errors: Option<Value>,
}

/// The session identifier currently stored on a [`crate::Client`].
///
/// Serializes as `{ "sessionId": <value or null> }`.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Builder)]
#[serde(rename_all = "camelCase")]
pub struct CurrentCustomer {
    #[builder(into)]
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn current_customer_serializes_null_when_logged_out() {
        let current = CurrentCustomer::default();

        assert_eq!(
            serde_json::to_value(&current).expect("serialize"),
            json!({ "sessionId": null })
        );
    }

    #[test]
    fn error_detail_reads_validation_errors() {
        let envelope: Envelope<ErrorDetail> = serde_json::from_value(json!({
            "data": {
                "error": "Customer is invalid.",
                "validationErrors": [{ "field": "emailAddress", "message": "is required" }]
            }
        }))
        .expect("deserialize");

        let detail = envelope.data.expect("detail");
        assert_eq!(detail.error.as_deref(), Some("Customer is invalid."));
        assert_eq!(
            detail.validation_errors,
            Some(json!([{ "field": "emailAddress", "message": "is required" }]))
        );
    }

    #[test]
    fn envelope_treats_null_data_as_absent() {
        let envelope: Envelope<Payload> =
            serde_json::from_value(json!({ "data": null })).expect("deserialize");

        assert!(envelope.data.is_none());
    }
}
