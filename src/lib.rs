#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod client;
pub mod error;
pub(crate) mod serde_helpers;
pub mod types;

pub use client::{Client, Config};
use reqwest::Request;

use crate::error::Error;
use crate::types::Payload;

pub type Result<T> = std::result::Result<T, Error>;

/// Production API host.
pub const PRODUCTION_HOST: &str = "https://api.hypothesis.app";

/// Host of a locally running API, useful while developing against the API itself.
pub const DEVELOPMENT_HOST: &str = "http://localhost:4000/api";

/// Environment variable read by [`Client::from_env`] for the API key.
pub const API_KEY_VAR: &str = "HYPOTHESIS_API_KEY";

/// Environment variable read by [`Client::from_env`] to override the host.
pub const HOST_VAR: &str = "HYPOTHESIS_API_URL";

/// Environment variable read by [`Client::from_env`] to turn on debug mode (`1` or `true`).
pub const DEBUG_VAR: &str = "HYPOTHESIS_DEBUG";

/// Header carrying the API key on every request.
pub(crate) const API_KEY_HEADER: &str = "x-api-key";

/// Executes a fully built request and unwraps the `{ "data": ... }` envelope.
///
/// Non-successful statuses become [`error::Kind::Status`] errors carrying the server's `error`
/// message and `validationErrors`, or the raw body when it has neither.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request, debug),
        fields(
            method = %request.method(),
            path = request.url().path(),
            status_code
        )
    )
)]
async fn request(
    client: &reqwest::Client,
    request: Request,
    #[cfg_attr(
        not(feature = "tracing"),
        expect(unused_variables, reason = "debug output is only emitted through tracing")
    )]
    debug: bool,
) -> Result<Option<Payload>> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    #[cfg(feature = "tracing")]
    if debug {
        let body = request
            .body()
            .and_then(reqwest::Body::as_bytes)
            .map(String::from_utf8_lossy)
            .unwrap_or_default();

        tracing::info!(
            method = %method,
            url = %request.url(),
            body = %body,
            "sending request"
        );
    }

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    let body = response.text().await?;

    if !status_code.is_success() {
        let detail = serde_helpers::decode_error_detail(&body).unwrap_or_default();
        let message = detail.error.unwrap_or(body);

        #[cfg(feature = "tracing")]
        {
            tracing::warn!(
                status = %status_code,
                method = %method,
                path = %path,
                message = %message,
                "API request failed"
            );

            if debug && let Some(validation_errors) = &detail.validation_errors {
                tracing::info!(
                    path = %path,
                    validation_errors = %validation_errors,
                    "API validation errors"
                );
            }
        }

        return Err(Error::status(
            status_code,
            method,
            path,
            message,
            detail.validation_errors,
        ));
    }

    serde_helpers::decode_payload(&body)
}
