//! Shared wiring for integration tests: a client over the scripted
//! transport and connector from `rukun-test-utils`.

#![allow(dead_code)]

use rukun_client::persistence::{KeyValueStore, TOKEN_KEY, USER_KEY};
use rukun_client::{ClientConfig, ConnectionState, MemoryStore, ReconnectConfig, RukunClient};
use rukun_core::User;
use rukun_test_utils::fixtures;
use rukun_test_utils::{MockConnector, MockTransport};
use std::sync::Arc;
use std::time::Duration;

pub const API_URL: &str = "https://api.rukun.test";
pub const WS_URL: &str = "wss://ws.rukun.test/socket";

pub struct Harness {
    pub client: RukunClient,
    pub transport: Arc<MockTransport>,
    pub connector: Arc<MockConnector>,
    pub storage: Arc<MemoryStore>,
}

pub fn config() -> ClientConfig {
    ClientConfig {
        api_base_url: API_URL.to_string(),
        ws_base_url: WS_URL.to_string(),
        reconnect: ReconnectConfig {
            base_delay_ms: 1_000,
            max_attempts: 5,
        },
        ..ClientConfig::default()
    }
}

/// Harness with empty storage, so the client starts signed out.
pub fn signed_out() -> Harness {
    build(Arc::new(MemoryStore::new()), MockConnector::new())
}

/// Harness whose storage holds a session for `user`. The client restores
/// it and starts connecting through `connector` immediately.
pub fn restored(user: &User, connector: Arc<MockConnector>) -> Harness {
    let storage = Arc::new(MemoryStore::new());
    seed_session(&storage, fixtures::TEST_TOKEN, user);
    build(storage, connector)
}

pub fn seed_session(storage: &MemoryStore, token: &str, user: &User) {
    let user_json = serde_json::to_string(user).expect("user serializes");
    storage.set(TOKEN_KEY, token).expect("token stored");
    storage.set(USER_KEY, &user_json).expect("user stored");
}

fn build(storage: Arc<MemoryStore>, connector: Arc<MockConnector>) -> Harness {
    let transport = MockTransport::new();
    let client = RukunClient::with_parts(&config(), storage.clone(), transport.clone(), connector.clone());
    Harness {
        client,
        transport,
        connector,
        storage,
    }
}

/// Wait until the socket reports `expected`, failing after a minute of
/// (possibly virtual) time.
pub async fn wait_for_state(client: &RukunClient, expected: ConnectionState) {
    let mut states = client.ws().subscribe_state();
    let reached = tokio::time::timeout(Duration::from_secs(60), states.wait_for(|state| *state == expected)).await;
    assert!(
        matches!(reached, Ok(Ok(_))),
        "socket never reached {:?}, last state {:?}",
        expected,
        client.ws().state()
    );
}
