//! Integration tests for the realtime socket as driven by the session.
//!
//! Covers:
//! - A restored session connects with the token in the query string
//! - Reconnects back off 1s, 2s, 4s, 8s, 16s and then give up
//! - Reconnects read the current token and stop once the session is cleared
//! - Inbound events reach every listener; malformed frames are skipped
//! - Login opens the socket and logout closes it for good

use rukun_client::{listener, ConnectionState, ListenerError};
use rukun_core::LoginRequest;
use rukun_test_utils::fixtures::{self, TEST_TOKEN};
use rukun_test_utils::{MockConnector, Method};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;

#[path = "support/harness.rs"]
mod harness;

use harness::wait_for_state;

fn channel_listener() -> (rukun_client::Listener, mpsc::UnboundedReceiver<Value>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = listener(move |payload: &Value| {
        tx.send(payload.clone())
            .map_err(|err| ListenerError::new(err.to_string()))
    });
    (handle, rx)
}

async fn next_payload(rx: &mut mpsc::UnboundedReceiver<Value>) -> Value {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("listener not called in time")
        .expect("listener channel closed")
}

// ============================================================================
// CONNECTION LIFECYCLE
// ============================================================================

#[tokio::test(start_paused = true)]
async fn restored_session_connects_with_its_token() {
    let connector = MockConnector::new();
    let _socket = connector.push_open();
    let h = harness::restored(&fixtures::resident(), connector);

    assert!(h.client.auth_store().is_authenticated());
    wait_for_state(&h.client, ConnectionState::Connected).await;

    let urls = h.connector.urls();
    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0], format!("{}?token={}", harness::WS_URL, TEST_TOKEN));
}

#[tokio::test(start_paused = true)]
async fn reconnect_backs_off_exponentially_then_gives_up() {
    let connector = MockConnector::new();
    connector.push_failures(6);
    let h = harness::restored(&fixtures::resident(), connector);

    wait_for_state(&h.client, ConnectionState::Abandoned).await;

    let times = h.connector.call_times();
    assert_eq!(times.len(), 6, "initial attempt plus five reconnects");
    let gaps: Vec<u64> = times.windows(2).map(|w| (w[1] - w[0]).as_secs()).collect();
    assert_eq!(gaps, vec![1, 2, 4, 8, 16]);

    tokio::time::advance(Duration::from_secs(600)).await;
    tokio::task::yield_now().await;
    assert_eq!(h.connector.call_count(), 6);
}

#[tokio::test(start_paused = true)]
async fn dropped_socket_reconnects_after_the_base_delay() {
    let connector = MockConnector::new();
    let first = connector.push_open();
    let _second = connector.push_open();
    let h = harness::restored(&fixtures::resident(), connector);
    wait_for_state(&h.client, ConnectionState::Connected).await;

    drop(first);
    wait_for_state(&h.client, ConnectionState::Reconnecting { attempt: 1, delay: Duration::from_secs(1) }).await;
    wait_for_state(&h.client, ConnectionState::Connected).await;

    let times = h.connector.call_times();
    assert_eq!(times.len(), 2);
    assert_eq!((times[1] - times[0]).as_secs(), 1);
}

#[tokio::test(start_paused = true)]
async fn cleared_session_stops_reconnecting() {
    let connector = MockConnector::new();
    let first = connector.push_open();
    let _unused = connector.push_open();
    let h = harness::restored(&fixtures::resident(), connector);
    wait_for_state(&h.client, ConnectionState::Connected).await;

    h.client.auth_store().clear_auth();
    drop(first);
    wait_for_state(&h.client, ConnectionState::Disconnected).await;

    tokio::time::advance(Duration::from_secs(60)).await;
    tokio::task::yield_now().await;
    assert_eq!(h.connector.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn refreshed_token_is_used_for_later_connections() {
    let connector = MockConnector::new();
    let _first = connector.push_open();
    let second = connector.push_open();
    let _third = connector.push_open();
    let h = harness::restored(&fixtures::resident(), connector);
    h.transport.respond(
        Method::POST,
        "/auth/refresh",
        200,
        fixtures::login_body("fresh-token", &fixtures::resident()),
    );
    wait_for_state(&h.client, ConnectionState::Connected).await;

    h.client.auth().refresh_token().await.expect("refresh");
    wait_for_state(&h.client, ConnectionState::Connected).await;

    drop(second);
    wait_for_state(&h.client, ConnectionState::Reconnecting { attempt: 1, delay: Duration::from_secs(1) }).await;
    wait_for_state(&h.client, ConnectionState::Connected).await;

    let fresh = format!("{}?token=fresh-token", harness::WS_URL);
    let urls = h.connector.urls();
    assert_eq!(urls.len(), 3);
    assert_eq!(urls[0], format!("{}?token={}", harness::WS_URL, TEST_TOKEN));
    assert_eq!(urls[1], fresh);
    assert_eq!(urls[2], fresh);
}

// ============================================================================
// MESSAGING
// ============================================================================

#[tokio::test(start_paused = true)]
async fn inbound_events_fan_out_and_malformed_frames_are_skipped() {
    let connector = MockConnector::new();
    let socket = connector.push_open();
    let h = harness::restored(&fixtures::resident(), connector);

    let (first, mut first_rx) = channel_listener();
    let (second, mut second_rx) = channel_listener();
    assert!(h.client.ws().on("bill_created", first.clone()));
    assert!(h.client.ws().on("bill_created", second));
    assert!(!h.client.ws().on("bill_created", first.clone()), "duplicate registration");

    wait_for_state(&h.client, ConnectionState::Connected).await;
    socket.push_raw("{not json");
    socket.push("bill_created", json!({ "id": "b-7" }));

    assert_eq!(next_payload(&mut first_rx).await, json!({ "id": "b-7" }));
    assert_eq!(next_payload(&mut second_rx).await, json!({ "id": "b-7" }));

    assert!(h.client.ws().off("bill_created", &first));
    socket.push("bill_created", json!({ "id": "b-8" }));
    assert_eq!(next_payload(&mut second_rx).await, json!({ "id": "b-8" }));
    assert!(first_rx.try_recv().is_err());
    assert!(h.client.ws().is_connected());
}

#[tokio::test(start_paused = true)]
async fn outbound_messages_are_sent_only_while_connected() {
    let connector = MockConnector::new();
    let mut socket = connector.push_open();
    let h = harness::restored(&fixtures::resident(), connector);

    wait_for_state(&h.client, ConnectionState::Connected).await;
    assert!(h.client.ws().send("join_block", json!({ "block": "A" })));

    let frame = tokio::time::timeout(Duration::from_secs(5), socket.sent.recv())
        .await
        .expect("frame not sent in time")
        .expect("socket closed");
    let frame: Value = serde_json::from_str(&frame).expect("frame is JSON");
    assert_eq!(frame, json!({ "type": "join_block", "payload": { "block": "A" } }));

    h.client.ws().disconnect();
    assert!(!h.client.ws().send("join_block", json!({ "block": "B" })));
}

// ============================================================================
// SESSION INTEGRATION
// ============================================================================

#[tokio::test(start_paused = true)]
async fn login_opens_the_socket() {
    let h = harness::signed_out();
    let _socket = h.connector.push_open();
    h.transport.respond(
        Method::POST,
        "/auth/login",
        200,
        fixtures::login_body(TEST_TOKEN, &fixtures::resident()),
    );

    let response = h
        .client
        .auth()
        .login(&LoginRequest {
            email: "budi@example.com".to_string(),
            password: "rahasia".to_string(),
        })
        .await
        .expect("login");

    assert!(response.success);
    assert_eq!(h.client.auth_store().token(), Some(TEST_TOKEN.to_string()));
    wait_for_state(&h.client, ConnectionState::Connected).await;
}

#[tokio::test(start_paused = true)]
async fn logout_clears_everything_even_when_the_server_fails() {
    let connector = MockConnector::new();
    let _socket = connector.push_open();
    let h = harness::restored(&fixtures::resident(), connector);
    h.transport
        .respond(Method::GET, "/users/profile", 200, fixtures::ok_body(fixtures::resident()))
        .fail(Method::POST, "/auth/logout", "connection reset");

    wait_for_state(&h.client, ConnectionState::Connected).await;
    h.client.users().get_profile().await.expect("profile");
    assert!(!h.client.http().cache().is_empty());

    let result = h.client.auth().logout().await;
    assert!(result.is_err());
    assert!(!h.client.auth_store().is_authenticated());
    assert!(h.client.http().cache().is_empty());
    assert_eq!(h.client.ws().state(), ConnectionState::Disconnected);

    tokio::time::advance(Duration::from_secs(120)).await;
    tokio::task::yield_now().await;
    assert_eq!(h.connector.call_count(), 1);
    assert!(h.storage.is_empty());
}
