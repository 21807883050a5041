//! Creates, updates and deletes customers, one by one and in bulk.
//!
//! Run with tracing enabled:
//! ```sh
//! HYPOTHESIS_API_KEY=... RUST_LOG=info,hyper_util=off,hyper=off,reqwest=off,rustls=off \
//!   cargo run --example customers --features tracing
//! ```

use hypothesis_client_sdk::Client;
use hypothesis_client_sdk::error::Status;
use hypothesis_client_sdk::types::BulkCreateRequest;
use serde_json::json;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let client = Client::from_env()?;
    let customers = client.customers();

    match customers
        .create(&json!({ "emailAddress": "ada@example.com", "name": "Ada" }))
        .await
    {
        Ok(payload) => info!(endpoint = "create", payload = ?payload),
        Err(e) => match e.downcast_ref::<Status>() {
            Some(status) => warn!(
                endpoint = "create",
                status = %status.status_code,
                message = %status.message,
                validation_errors = ?status.validation_errors
            ),
            None => debug!(endpoint = "create", error = %e),
        },
    }

    match customers
        .update("ada@example.com", &json!({ "name": "Ada Lovelace" }))
        .await
    {
        Ok(payload) => info!(endpoint = "update", payload = ?payload),
        Err(e) => debug!(endpoint = "update", error = %e),
    }

    let request = BulkCreateRequest::builder()
        .items(vec![
            json!({ "emailAddress": "grace@example.com" }),
            json!({ "emailAddress": "edsger@example.com" }),
        ])
        .build();

    match customers.bulk().create(&request).await {
        Ok(payload) => info!(endpoint = "bulk_create", payload = ?payload),
        Err(e) => debug!(endpoint = "bulk_create", error = %e),
    }

    match customers.delete("ada@example.com").await {
        Ok(payload) => info!(endpoint = "delete", payload = ?payload),
        Err(e) => debug!(endpoint = "delete", error = %e),
    }

    Ok(())
}
