#![allow(
    unused,
    reason = "Each test crate only uses part of the shared helpers"
)]

use httpmock::MockServer;
use hypothesis_client_sdk::{Client, Config};

pub const API_KEY: &str = "k1";
pub const API_KEY_HEADER: &str = "x-api-key";

pub fn create_client(server: &MockServer) -> anyhow::Result<Client> {
    let config = Config::builder().host(server.base_url()).build();

    Ok(Client::new(API_KEY, config)?)
}

pub fn create_debug_client(server: &MockServer) -> anyhow::Result<Client> {
    let config = Config::builder()
        .host(server.base_url())
        .debug(true)
        .build();

    Ok(Client::new(API_KEY, config)?)
}

pub fn create_client_with_session(server: &MockServer, session_id: &str) -> anyhow::Result<Client> {
    let config = Config::builder()
        .host(server.base_url())
        .session_id(session_id)
        .build();

    Ok(Client::new(API_KEY, config)?)
}
