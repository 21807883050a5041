//! Request and response types for the Hypothesis API.
//!
//! Request bodies are plain JSON objects on the wire. Free-form records (customers, updates,
//! event properties) are carried as [`Properties`] so callers are not forced into a schema the
//! API does not impose.

pub mod request;
pub mod response;

pub use request::{BulkCreateRequest, Properties, TrackRequest};
pub use response::{CurrentCustomer, ErrorDetail, Payload};
