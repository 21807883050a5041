use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use bon::Builder;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Serialize;
use url::Url;

use crate::error::Error;
use crate::types::request::{SessionBody, to_object};
use crate::types::{BulkCreateRequest, CurrentCustomer, Payload, Properties, TrackRequest};
use crate::{API_KEY_HEADER, API_KEY_VAR, DEBUG_VAR, HOST_VAR, PRODUCTION_HOST, Result};

/// Configuration for [`Client`]
#[derive(Clone, Debug, Default, Builder)]
pub struct Config {
    /// Session identifier the [`Client`] starts with, as if [`Customers::login`] had been called
    /// without sending a request.
    #[builder(into)]
    session_id: Option<String>,
    /// Log every outgoing request and the server's validation detail on failure. Only has an
    /// effect with the `tracing` feature.
    #[builder(default)]
    debug: bool,
    /// Override for the API host. Defaults to [`PRODUCTION_HOST`].
    #[builder(into)]
    host: Option<String>,
    /// Total time allowed for a single request, including reading the body. Unbounded if unset.
    timeout: Option<Duration>,
}

/// Client for the Hypothesis analytics API.
///
/// A [`Client`] holds the API key, the debug flag and a single session identifier naming the
/// customer currently logged in. The identifier is set by [`Customers::login`], cleared by a
/// successful [`Customers::logout`], and attached to tracked events.
///
/// [`Client`] is cheap to clone and thread-safe. Clones share the session identifier. Concurrent
/// calls that change it are not ordered with respect to each other: the last write wins.
///
/// ```rust,no_run
/// use hypothesis_client_sdk::{Client, Config};
/// use hypothesis_client_sdk::types::TrackRequest;
///
/// # async fn example() -> hypothesis_client_sdk::Result<()> {
/// let client = Client::new("api-key", Config::default())?;
///
/// client.customers().login("customer-123").await?;
/// client
///     .track(TrackRequest::builder().key("dashboard.viewed").build())
///     .await?;
/// client.customers().logout(None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    /// Sent as the `x-api-key` header.
    api_key: SecretString,
    /// The [`Url`] against which `client` is making requests.
    host: Url,
    debug: bool,
    session_id: RwLock<Option<String>>,
    client: ReqwestClient,
}

impl Client {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::Configuration`] error if `api_key` is blank or not a valid
    /// header value, or if the host cannot be used as a base URL.
    pub fn new(api_key: &str, config: Config) -> Result<Client> {
        if api_key.trim().is_empty() {
            return Err(Error::configuration("A valid API key is required."));
        }
        HeaderValue::from_str(api_key)?;

        let host = Url::parse(config.host.as_deref().unwrap_or(PRODUCTION_HOST))?;
        if host.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "{host} cannot be used as a base URL"
            )));
        }

        let mut headers = HeaderMap::new();

        headers.insert("User-Agent", HeaderValue::from_static("hypothesis_rs"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let mut builder = ReqwestClient::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                api_key: SecretString::from(api_key.to_owned()),
                host,
                debug: config.debug,
                session_id: RwLock::new(config.session_id.filter(|id| !id.is_empty())),
                client: builder.build()?,
            }),
        })
    }

    /// Creates a client from [`API_KEY_VAR`], [`HOST_VAR`] and [`DEBUG_VAR`].
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::Configuration`] error if [`API_KEY_VAR`] is unset, or for
    /// any reason [`Client::new`] would.
    pub fn from_env() -> Result<Client> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|e| Error::configuration(format!("{API_KEY_VAR}: {e}")))?;
        let debug = std::env::var(DEBUG_VAR)
            .is_ok_and(|value| value == "1" || value.eq_ignore_ascii_case("true"));

        let config = Config::builder()
            .maybe_host(std::env::var(HOST_VAR).ok())
            .debug(debug)
            .build();

        Client::new(&api_key, config)
    }

    /// Returns the host URL for the client.
    #[must_use]
    pub fn host(&self) -> &Url {
        &self.inner.host
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &SecretString {
        &self.inner.api_key
    }

    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.inner.debug
    }

    /// Returns the stored session identifier, if a customer is logged in.
    #[must_use]
    pub fn session_id(&self) -> Option<String> {
        self.inner
            .session_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_session_id(&self, session_id: Option<String>) {
        *self
            .inner
            .session_id
            .write()
            .unwrap_or_else(PoisonError::into_inner) = session_id;
    }

    /// Customer endpoints.
    #[must_use]
    pub fn customers(&self) -> Customers<'_> {
        Customers { client: self }
    }

    /// Record a tracked event with `POST /v1/behavior`.
    ///
    /// The stored session identifier is attached unless the request names its own. See
    /// [`TrackRequest`] for the full resolution order.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use hypothesis_client_sdk::{Client, Config};
    /// use hypothesis_client_sdk::types::TrackRequest;
    /// use serde_json::json;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::new("api-key", Config::default())?;
    ///
    /// let request = TrackRequest::builder()
    ///     .key("plan.upgraded")
    ///     .properties(json!({ "plan": "pro" }).as_object().cloned().unwrap_or_default())
    ///     .build();
    /// let payload = client.track(request).await?;
    /// println!("{payload:?}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn track(&self, request: TrackRequest) -> Result<Option<Payload>> {
        let body = request.into_body(self.session_id())?;

        self.send(Method::POST, &["behavior"], &body).await
    }

    /// `{host}/v1/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.host.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::configuration(format!("{} cannot be used as a base URL", self.host()))
            })?
            .pop_if_empty()
            .push("v1")
            .extend(segments);

        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<Option<Payload>> {
        let mut api_key = HeaderValue::from_str(self.inner.api_key.expose_secret())?;
        api_key.set_sensitive(true);

        let request = self
            .inner
            .client
            .request(method, self.endpoint(segments)?)
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .build()?;

        crate::request(&self.inner.client, request, self.inner.debug).await
    }
}

/// Customer endpoints, borrowed from a [`Client`] with [`Client::customers`].
#[derive(Clone, Copy, Debug)]
pub struct Customers<'client> {
    client: &'client Client,
}

impl<'client> Customers<'client> {
    /// Start a session with `PUT /v1/customers/login`.
    ///
    /// The identifier is stored on the client before the request is sent, replacing any previous
    /// one, and stays stored even if the request fails.
    pub async fn login(&self, session_id: &str) -> Result<Option<Payload>> {
        if session_id.is_empty() {
            return Err(Error::validation("Must pass a sessionId."));
        }

        self.client.set_session_id(Some(session_id.to_owned()));

        self.client
            .send(Method::PUT, &["customers", "login"], &SessionBody { session_id })
            .await
    }

    /// End a session with `PUT /v1/customers/logout`.
    ///
    /// Uses `session_id` when given, otherwise the stored identifier. The stored identifier is
    /// cleared once the request succeeds.
    pub async fn logout(&self, session_id: Option<&str>) -> Result<Option<Payload>> {
        let session_id = match session_id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_owned(),
            None => self
                .client
                .session_id()
                .ok_or_else(|| Error::validation("Must have a sessionId to logout."))?,
        };

        let payload = self
            .client
            .send(
                Method::PUT,
                &["customers", "logout"],
                &SessionBody {
                    session_id: &session_id,
                },
            )
            .await?;

        self.client.set_session_id(None);

        Ok(payload)
    }

    /// Create a customer with `POST /v1/customers`. `customer` must serialize to a JSON object
    /// and is sent verbatim.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use hypothesis_client_sdk::{Client, Config};
    /// use serde_json::json;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::new("api-key", Config::default())?;
    ///
    /// let customer = client
    ///     .customers()
    ///     .create(&json!({ "emailAddress": "ada@example.com" }))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create<T: Serialize + ?Sized>(&self, customer: &T) -> Result<Option<Payload>> {
        let customer: Properties = to_object(customer, "Must pass a customer.")?;

        self.client
            .send(Method::POST, &["customers"], &customer)
            .await
    }

    /// Update a customer with `PUT /v1/customers/{session_id}`. `update` must serialize to a JSON
    /// object and is sent verbatim.
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        session_id: &str,
        update: &T,
    ) -> Result<Option<Payload>> {
        if session_id.is_empty() {
            return Err(Error::validation("Must pass a sessionId."));
        }
        let update: Properties = to_object(update, "Must pass an update for the customer.")?;

        self.client
            .send(Method::PUT, &["customers", session_id], &update)
            .await
    }

    /// Delete a customer with `DELETE /v1/customers/{session_id}`.
    pub async fn delete(&self, session_id: &str) -> Result<Option<Payload>> {
        if session_id.is_empty() {
            return Err(Error::validation("Must pass a sessionId."));
        }

        self.client
            .send(Method::DELETE, &["customers", session_id], &Properties::new())
            .await
    }

    /// The session identifier stored on the client. Does not touch the network.
    #[must_use]
    pub fn current(&self) -> CurrentCustomer {
        CurrentCustomer {
            session_id: self.client.session_id(),
        }
    }

    /// Bulk customer endpoints.
    #[must_use]
    pub fn bulk(&self) -> Bulk<'client> {
        Bulk {
            client: self.client,
        }
    }
}

/// Bulk customer endpoints, borrowed from a [`Client`] with [`Customers::bulk`].
#[derive(Clone, Copy, Debug)]
pub struct Bulk<'client> {
    client: &'client Client,
}

impl Bulk<'_> {
    /// Create many customers in one call with `POST /v1/customers/bulk`.
    pub async fn create(&self, request: &BulkCreateRequest) -> Result<Option<Payload>> {
        request.validate()?;

        self.client
            .send(Method::POST, &["customers", "bulk"], request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;

    fn client() -> Client {
        Client::new("k1", Config::default()).expect("client")
    }

    #[test]
    fn new_without_api_key_fails() {
        let err = Client::new("", Config::default()).expect_err("empty key");

        assert_eq!(err.kind(), Kind::Configuration);
        assert!(err.to_string().contains("A valid API key is required."));
    }

    #[test]
    fn new_with_blank_api_key_fails() {
        let err = Client::new("   ", Config::default()).expect_err("blank key");

        assert_eq!(err.kind(), Kind::Configuration);
    }

    #[test]
    fn new_with_invalid_host_fails() {
        let config = Config::builder().host("not a url").build();
        let err = Client::new("k1", config).expect_err("bad host");

        assert_eq!(err.kind(), Kind::Configuration);
    }

    #[test]
    fn new_with_non_base_host_fails() {
        let config = Config::builder().host("mailto:team@hypothesis.app").build();
        let err = Client::new("k1", config).expect_err("non-base host");

        assert_eq!(err.kind(), Kind::Configuration);
    }

    #[test]
    fn defaults_to_production_host() {
        let client = client();

        assert_eq!(client.host().as_str(), "https://api.hypothesis.app/");
        assert!(!client.is_debug());
        assert!(client.session_id().is_none());
        assert_eq!(client.api_key().expose_secret(), "k1");
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let output = format!("{:?}", client());

        assert!(!output.contains("\"k1\""), "leaked api key: {output}");
    }

    #[test]
    fn initial_session_id_comes_from_config() {
        let config = Config::builder().session_id("c1").build();
        let client = Client::new("k1", config).expect("client");

        assert_eq!(client.customers().current().session_id.as_deref(), Some("c1"));
    }

    #[test]
    fn endpoint_appends_version_and_segments() {
        let client = client();

        assert_eq!(
            client.endpoint(&["customers", "bulk"]).expect("url").as_str(),
            "https://api.hypothesis.app/v1/customers/bulk"
        );
    }

    #[test]
    fn endpoint_keeps_host_path_prefix() {
        let config = Config::builder().host(crate::DEVELOPMENT_HOST).build();
        let client = Client::new("k1", config).expect("client");

        assert_eq!(
            client.endpoint(&["behavior"]).expect("url").as_str(),
            "http://localhost:4000/api/v1/behavior"
        );
    }

    #[test]
    fn endpoint_encodes_session_id_segment() {
        let client = client();

        assert_eq!(
            client
                .endpoint(&["customers", "a/b c"])
                .expect("url")
                .as_str(),
            "https://api.hypothesis.app/v1/customers/a%2Fb%20c"
        );
    }

    #[test]
    fn clones_share_session_id() {
        let client = client();
        let clone = client.clone();

        client.set_session_id(Some("c1".to_owned()));

        assert_eq!(clone.session_id().as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn logout_without_session_fails_before_sending() {
        let err = client()
            .customers()
            .logout(None)
            .await
            .expect_err("no session");

        assert_eq!(err.kind(), Kind::Validation);
        assert!(err.to_string().contains("Must have a sessionId to logout."));
    }

    #[tokio::test]
    async fn update_without_arguments_reports_missing_id_first() {
        let missing: Option<Properties> = None;
        let err = client()
            .customers()
            .update("", &missing)
            .await
            .expect_err("no id");

        assert_eq!(err.kind(), Kind::Validation);
        assert!(err.to_string().contains("Must pass a sessionId."));
        assert!(!err.to_string().contains("update"));
    }
}
