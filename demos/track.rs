//! Tracks an event for a logged in customer, then logs the customer out.
//!
//! Run against a local API with tracing enabled:
//! ```sh
//! HYPOTHESIS_API_KEY=... HYPOTHESIS_API_URL=http://localhost:4000/api HYPOTHESIS_DEBUG=1 \
//!   RUST_LOG=info,hyper_util=off,hyper=off,reqwest=off,rustls=off \
//!   cargo run --example track --features tracing
//! ```
//!
//! Optionally log to a file:
//! ```sh
//! LOG_FILE=track.log HYPOTHESIS_API_KEY=... cargo run --example track --features tracing
//! ```

use std::fs::File;

use hypothesis_client_sdk::Client;
use hypothesis_client_sdk::types::TrackRequest;
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = File::create(path)?;
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let client = Client::from_env()?;
    let customers = client.customers();

    match customers.login("demo-customer").await {
        Ok(payload) => info!(endpoint = "login", payload = ?payload),
        Err(e) => debug!(endpoint = "login", error = %e),
    }

    let request = TrackRequest::builder()
        .key("demo.event")
        .properties(
            json!({ "source": "demo", "attempt": 1 })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        )
        .build();

    match client.track(request).await {
        Ok(payload) => info!(endpoint = "track", payload = ?payload),
        Err(e) => debug!(endpoint = "track", error = %e),
    }

    match customers.logout(None).await {
        Ok(_) => info!(endpoint = "logout", current = ?customers.current()),
        Err(e) => debug!(endpoint = "logout", error = %e),
    }

    Ok(())
}
