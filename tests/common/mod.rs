//! Common fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use flowdock::adapters::mock::{MockEventSource, MockHttpClient};
use flowdock::{Client, ClientConfig};

pub const TEST_TOKEN: &str = "test-api-token";
pub const TEST_ORG: &str = "acme";
pub const TEST_FLOW: &str = "main";

/// `Basic base64("test-api-token:")`
pub const TEST_AUTHORIZATION: &str = "Basic dGVzdC1hcGktdG9rZW46";

/// Install a test log writer once. Respects `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Config pointing both base URLs at a local server.
pub fn test_config(server_uri: &str) -> ClientConfig {
    ClientConfig::new()
        .with_api_url(server_uri)
        .with_stream_url(server_uri)
        .with_token(TEST_TOKEN)
        .with_timeout(Duration::from_secs(5))
        .with_retry_interval(Duration::from_millis(50))
}

/// Client with real transports against a local server.
pub fn test_client(server_uri: &str) -> Client {
    init_tracing();
    Client::new(test_config(server_uri)).expect("valid test config")
}

/// Client with mock transports.
pub fn mock_client(config: ClientConfig) -> (Client, MockHttpClient, MockEventSource) {
    init_tracing();
    let http = MockHttpClient::new();
    let events = MockEventSource::new();
    let client = Client::with_transports(config, Arc::new(http.clone()), Arc::new(events.clone()))
        .expect("valid test config");
    (client, http, events)
}

/// JSON payload of a chat message with the given id.
pub fn message_json(id: i64) -> String {
    format!(
        r#"{{"id":{},"event":"message","flow":"flow-1","user":"18","sent":1317397485508,"content":"message {}"}}"#,
        id, id
    )
}
