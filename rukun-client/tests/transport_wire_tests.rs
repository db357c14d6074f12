//! Wire-level tests for `ReqwestTransport` against a local mock server.
//!
//! Covers:
//! - Bearer token and JSON content type on authenticated requests
//! - Multipart uploads carry their own boundary and the file bytes
//! - Server error bodies surface as rejections through the HTTP client
//! - Binary downloads return raw bytes

use rukun_client::persistence::MemoryStore;
use rukun_client::{AuthStore, HttpClient, ReqwestTransport, RukunApi, WsManager};
use rukun_client::{ReconnectPolicy, TungsteniteConnector};
use rukun_core::{Attachment, ListQuery};
use rukun_test_utils::fixtures;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer, token: Option<&str>) -> RukunApi {
    let auth = AuthStore::new(Arc::new(MemoryStore::new()));
    if let Some(token) = token {
        auth.set_auth(token, fixtures::resident());
    }
    let transport = ReqwestTransport::new(None).expect("reqwest client builds");
    let http = HttpClient::new(Arc::new(transport), &server.uri(), auth.clone());
    let ws = WsManager::new(
        Arc::new(TungsteniteConnector),
        "ws://127.0.0.1:9/socket",
        auth,
        ReconnectPolicy::default(),
    );
    RukunApi::new(http, ws)
}

#[tokio::test]
async fn authenticated_json_request_carries_bearer_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bills"))
        .and(query_param("page", "1"))
        .and(query_param("status", "overdue"))
        .and(header("authorization", "Bearer wire-token"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::ok_body(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server, Some("wire-token"));
    let query = ListQuery::default().with_status(rukun_core::BillStatus::Overdue);
    let response = api.bills().get_bills(&query).await.expect("bills");
    assert_eq!(response.data, Some(Vec::new()));
}

#[tokio::test]
async fn server_error_body_becomes_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/forgot-password"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Email not registered" })))
        .mount(&server)
        .await;

    let api = api_for(&server, None);
    let err = api
        .auth()
        .forgot_password("nobody@example.com")
        .await
        .unwrap_err();
    assert_eq!(err.status, 404);
    assert_eq!(err.message, "Email not registered");
}

#[tokio::test]
async fn avatar_upload_is_sent_as_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/avatar"))
        .and(header("authorization", "Bearer wire-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(fixtures::ok_body(json!({ "avatarUrl": "/img/a.png" }))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server, Some("wire-token"));
    let file = Attachment::new("a.png", b"PNGDATA".to_vec()).with_content_type("image/png");
    let response = api.users().upload_avatar(file).await.expect("upload");
    assert_eq!(response.data.map(|d| d.avatar_url), Some("/img/a.png".to_string()));

    let received = server.received_requests().await.expect("recording enabled");
    let request = &received[0];
    let content_type = request
        .headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data; boundary="), "{}", content_type);

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains(r#"name="avatar"; filename="a.png""#));
    assert!(body.to_lowercase().contains("content-type: image/png"));
    assert!(body.contains("PNGDATA"));
}

#[tokio::test]
async fn document_download_returns_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/d-1/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
        .mount(&server)
        .await;

    let api = api_for(&server, Some("wire-token"));
    let bytes = api.documents().download_document("d-1").await.expect("download");
    assert_eq!(&bytes[..], b"%PDF-1.7");
}
