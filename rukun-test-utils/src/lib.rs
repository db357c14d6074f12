//! Rukun Test Utilities
//!
//! Shared test infrastructure for the Rukun workspace:
//! - A scripted in-memory HTTP transport and WebSocket connector
//! - Proptest generators for domain records and list queries
//! - Fixtures for common records and response bodies
//! - Assertions on `ApiError` categories

pub use rukun_client::transport::{HttpRequest, HttpResponse, Method, RequestBody};
pub use rukun_core::{ApiError, ApiErrorKind, ApiResult};

use async_trait::async_trait;
use rukun_client::realtime::{WsChannel, WsConnector, WsError};
use rukun_client::transport::{Transport, TransportError};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::time::Instant;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// MOCK HTTP TRANSPORT
// ============================================================================

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    path: String,
    reply: Reply,
}

/// Transport that answers from a route table and records every request.
///
/// A route path containing `?` must match the request's path and query
/// exactly; otherwise only the path is compared. The most recently added
/// matching route wins. Unmatched requests get a 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `method path` with `status` and a JSON body.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.respond_raw(method, path, HttpResponse::new(status, body.to_string()))
    }

    pub fn respond_raw(&self, method: Method, path: &str, response: HttpResponse) -> &Self {
        self.add(method, path, Reply::Respond(response))
    }

    /// Fail `method path` without any response.
    pub fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.add(method, path, Reply::Fail(message.to_string()))
    }

    fn add(&self, method: Method, path: &str, reply: Reply) -> &Self {
        lock(&self.routes).push(Route {
            method,
            path: path.to_string(),
            reply,
        });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Requests sent to `method path`, matched like routes.
    pub fn calls_to(&self, method: Method, path: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|request| request.method == method && path_matches(path, &request_target(&request.url)))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn reset_requests(&self) {
        lock(&self.requests).clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let target = request_target(&request.url);
        let reply = lock(&self.routes)
            .iter()
            .rev()
            .find(|route| route.method == request.method && path_matches(&route.path, &target))
            .map(|route| route.reply.clone());
        lock(&self.requests).push(request);

        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(TransportError(message)),
            None => Ok(HttpResponse::new(404, r#"{"message":"Not found"}"#)),
        }
    }
}

/// Path and query of an absolute URL.
fn request_target(url: &str) -> String {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    match after_scheme.find('/') {
        Some(index) => after_scheme[index..].to_string(),
        None => "/".to_string(),
    }
}

fn path_matches(route: &str, target: &str) -> bool {
    if route.contains('?') {
        route == target
    } else {
        target.split('?').next() == Some(route)
    }
}

// ============================================================================
// MOCK WEBSOCKET CONNECTOR
// ============================================================================

enum Step {
    Open {
        frames: mpsc::UnboundedReceiver<String>,
        sent: mpsc::UnboundedSender<String>,
    },
    Fail,
}

/// Test side of a scripted socket.
///
/// Frames pushed into `frames` arrive at the manager; dropping `frames`
/// closes the socket. Messages the manager sends appear on `sent`.
pub struct MockSocket {
    pub frames: mpsc::UnboundedSender<String>,
    pub sent: mpsc::UnboundedReceiver<String>,
}

impl MockSocket {
    pub fn push(&self, event: &str, payload: Value) {
        let frame = serde_json::json!({ "type": event, "payload": payload }).to_string();
        let _ = self.frames.send(frame);
    }

    pub fn push_raw(&self, frame: &str) {
        let _ = self.frames.send(frame.to_string());
    }
}

/// Connector that plays back a script of opens and failures. Connects past
/// the end of the script fail.
#[derive(Default)]
pub struct MockConnector {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(Instant, String)>>,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_open(&self) -> MockSocket {
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        lock(&self.script).push_back(Step::Open {
            frames: frames_rx,
            sent: sent_tx,
        });
        MockSocket {
            frames: frames_tx,
            sent: sent_rx,
        }
    }

    pub fn push_failures(&self, count: usize) {
        let mut script = lock(&self.script);
        for _ in 0..count {
            script.push_back(Step::Fail);
        }
    }

    pub fn urls(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|(_, url)| url.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        lock(&self.calls).iter().map(|(at, _)| *at).collect()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl WsConnector for MockConnector {
    async fn connect(&self, url: &str) -> Result<WsChannel, WsError> {
        lock(&self.calls).push((Instant::now(), url.to_string()));
        let step = lock(&self.script).pop_front();
        match step {
            Some(Step::Open { frames, sent }) => {
                let inbound = futures_util::stream::unfold(frames, |mut frames| async move {
                    frames.recv().await.map(|text| (Ok(text), frames))
                });
                let outbound = futures_util::sink::unfold(sent, |sent, text: String| async move {
                    sent.send(text).map_err(|_| WsError::Closed)?;
                    Ok::<_, WsError>(sent)
                });
                Ok(WsChannel {
                    outbound: Box::pin(outbound),
                    inbound: Box::pin(inbound),
                })
            }
            Some(Step::Fail) | None => Err(WsError::Closed),
        }
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Rukun types.

    use chrono::{DateTime, Utc};
    use proptest::prelude::*;
    use rukun_core::*;

    pub fn arb_entity_id() -> impl Strategy<Value = EntityId> {
        "[a-z]{1,3}-[0-9]{1,6}"
    }

    /// Timestamps between 2020 and 2030, whole seconds.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_577_836_800i64..1_893_456_000i64)
            .prop_map(|secs| DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default())
    }

    pub fn arb_rupiah() -> impl Strategy<Value = Rupiah> {
        0i64..100_000_000
    }

    pub fn arb_role() -> impl Strategy<Value = Role> {
        proptest::sample::select(Role::ALL)
    }

    pub fn arb_bill_status() -> impl Strategy<Value = BillStatus> {
        proptest::sample::select(BillStatus::ALL)
    }

    pub fn arb_bill_type() -> impl Strategy<Value = BillType> {
        proptest::sample::select(BillType::ALL)
    }

    pub fn arb_user() -> impl Strategy<Value = User> {
        (
            arb_entity_id(),
            "[a-z]{3,10}",
            arb_role(),
            arb_entity_id(),
            "[A-F]",
            any::<bool>(),
            arb_timestamp(),
        )
            .prop_map(|(id, name, role, house_id, block, is_active, at)| User {
                email: format!("{}@example.com", name),
                phone: "081234567890".to_string(),
                house_name: format!("Blok {} No. 1", block),
                id,
                name,
                role,
                house_id,
                block_number: block,
                is_active,
                avatar: None,
                created_at: at,
                updated_at: at,
            })
    }

    pub fn arb_bill() -> impl Strategy<Value = Bill> {
        (
            arb_entity_id(),
            arb_entity_id(),
            arb_bill_type(),
            arb_rupiah(),
            arb_bill_status(),
            arb_timestamp(),
        )
            .prop_map(|(id, house_id, bill_type, amount, status, at)| Bill {
                id,
                house_id,
                bill_type,
                title: format!("Iuran {}", bill_type),
                description: None,
                amount,
                due_date: at,
                status,
                payment_date: None,
                payment_method: None,
                transaction_id: None,
                created_at: at,
            })
    }

    pub fn arb_list_query() -> impl Strategy<Value = ListQuery> {
        (1u32..50, 1u32..100, proptest::option::of(arb_bill_status())).prop_map(|(page, limit, status)| {
            let query = ListQuery::new(page, limit);
            match status {
                Some(status) => query.with_status(status),
                None => query,
            }
        })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records and response bodies.

    use chrono::{TimeZone, Utc};
    use rukun_core::*;
    use serde_json::{json, Value};

    pub const TEST_TOKEN: &str = "test-token";

    pub fn new_id() -> EntityId {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn timestamp() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).single().unwrap_or_default()
    }

    pub fn resident() -> User {
        User {
            id: "u-1".to_string(),
            email: "budi@example.com".to_string(),
            name: "Budi Santoso".to_string(),
            phone: "081234567890".to_string(),
            role: Role::Resident,
            house_id: "h-1".to_string(),
            house_name: "Blok A No. 1".to_string(),
            block_number: "A".to_string(),
            is_active: true,
            avatar: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    pub fn admin() -> User {
        User {
            id: "u-9".to_string(),
            email: "sari@example.com".to_string(),
            name: "Sari Wulandari".to_string(),
            role: Role::Admin,
            ..resident()
        }
    }

    pub fn house() -> House {
        House {
            id: "h-1".to_string(),
            block_number: "A".to_string(),
            house_number: "1".to_string(),
            area: 72.5,
            owner_name: "Budi Santoso".to_string(),
            owner_email: "budi@example.com".to_string(),
            resident_count: 4,
            status: HouseStatus::Occupied,
            created_at: timestamp(),
        }
    }

    pub fn bill(id: &str, status: BillStatus) -> Bill {
        Bill {
            id: id.to_string(),
            house_id: "h-1".to_string(),
            bill_type: BillType::MonthlyFee,
            title: "Iuran Oktober".to_string(),
            description: None,
            amount: 50_000,
            due_date: timestamp(),
            status,
            payment_date: None,
            payment_method: None,
            transaction_id: None,
            created_at: timestamp(),
        }
    }

    pub fn payment(bill_id: &str) -> Payment {
        Payment {
            id: "p-1".to_string(),
            bill_id: bill_id.to_string(),
            amount: 50_000,
            payment_method: PaymentMethod::BankTransfer,
            transaction_id: "TRX-0001".to_string(),
            status: PaymentStatus::Completed,
            payment_date: timestamp(),
            receipt: None,
            notes: None,
        }
    }

    pub fn report(id: &str) -> Report {
        Report {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            category: ReportCategory::Maintenance,
            title: "Lampu jalan mati".to_string(),
            description: "Gang 3 gelap sejak Senin".to_string(),
            location: Some("Gang 3".to_string()),
            priority: ReportPriority::High,
            status: ReportStatus::Submitted,
            images: Vec::new(),
            assigned_to: None,
            resolved_at: None,
            resolution: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    /// `{ "success": true, "data": data }`.
    pub fn ok_body(data: impl serde::Serialize) -> Value {
        json!({ "success": true, "data": data })
    }

    /// `{ "success": true }`.
    pub fn ack_body() -> Value {
        json!({ "success": true })
    }

    /// One page wrapped in the standard envelope.
    pub fn page_body(items: impl serde::Serialize, total: u64, page: u32, limit: u32) -> Value {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(u64::from(limit)) };
        ok_body(json!({
            "data": items,
            "total": total,
            "page": page,
            "limit": limit,
            "totalPages": total_pages,
        }))
    }

    pub fn login_body(token: &str, user: &User) -> Value {
        json!({
            "success": true,
            "token": token,
            "user": user,
            "expiresAt": "2026-10-20T08:00:00Z",
        })
    }

    pub fn error_body(message: &str) -> Value {
        json!({ "message": message })
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on `ApiError` categories.

    use super::*;

    /// Assert the server rejected the request with `status`.
    #[track_caller]
    pub fn assert_rejected<T: std::fmt::Debug>(result: &ApiResult<T>, status: u16) {
        match result {
            Err(err) if err.kind == ApiErrorKind::Rejected => {
                assert_eq!(err.status, status, "Wrong status in rejection: {:?}", err);
            }
            other => panic!("Expected rejection with status {}, got: {:?}", status, other),
        }
    }

    /// Assert the request never reached the server.
    #[track_caller]
    pub fn assert_network_error<T: std::fmt::Debug>(result: &ApiResult<T>) {
        match result {
            Err(err) if err.is_network() => assert_eq!(err.status, 0),
            other => panic!("Expected network error, got: {:?}", other),
        }
    }

    /// Assert a 2xx body failed to decode.
    #[track_caller]
    pub fn assert_invalid_payload<T: std::fmt::Debug>(result: &ApiResult<T>) {
        match result {
            Err(err) if err.kind == ApiErrorKind::InvalidPayload => {}
            other => panic!("Expected invalid payload error, got: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_target_strips_scheme_and_host() {
        assert_eq!(request_target("https://api.test/bills?page=1"), "/bills?page=1");
        assert_eq!(request_target("https://api.test"), "/");
    }

    #[test]
    fn routes_without_query_ignore_it() {
        assert!(path_matches("/bills", "/bills?page=1&limit=10"));
        assert!(!path_matches("/bills", "/bills/2"));
        assert!(path_matches("/bills?page=2&limit=10", "/bills?page=2&limit=10"));
        assert!(!path_matches("/bills?page=2&limit=10", "/bills?page=1&limit=10"));
    }

    #[tokio::test]
    async fn latest_route_wins_and_requests_are_recorded() {
        let transport = MockTransport::new();
        transport
            .respond(Method::GET, "/houses/1", 200, fixtures::ok_body(1))
            .respond(Method::GET, "/houses/1", 500, fixtures::error_body("down"));

        let response = transport
            .execute(HttpRequest::new(Method::GET, "https://api.test/houses/1"))
            .await
            .unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(transport.calls_to(Method::GET, "/houses/1"), 1);

        let missing = transport
            .execute(HttpRequest::new(Method::POST, "https://api.test/houses/1"))
            .await
            .unwrap();
        assert_eq!(missing.status, 404);
    }
}
