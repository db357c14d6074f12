//! HTTP client: bearer injection, response caching and error normalization.
//!
//! All REST traffic passes through [`HttpClient`]. It reads the token from the
//! [`AuthStore`] on every call, serves opted-in GETs from the
//! [`ResponseCache`], and turns every failure into an [`ApiError`]:
//!
//! - non-2xx status: `Rejected`, message from the body when readable
//! - no response at all: `Network`, status 0
//! - 2xx body that does not decode into the declared type: `InvalidPayload`

use crate::auth_store::AuthStore;
use crate::cache::{CacheStats, ResponseCache};
use crate::transport::{HttpRequest, HttpResponse, MultipartForm, RequestBody, Transport};
use bytes::Bytes;
use reqwest::Method;
use rukun_core::{ApiError, ApiResult, REQUEST_FAILED_MESSAGE, UPLOAD_FAILED_MESSAGE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default lifetime of a cached GET response.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache opt-in for a GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    NoCache,
    /// Cache with the client's default TTL.
    Default,
    Ttl(Duration),
}

#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    auth: AuthStore,
    cache: Arc<ResponseCache>,
    default_ttl: Duration,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str, auth: AuthStore) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            cache: Arc::new(ResponseCache::new()),
            default_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    // ------------------------------------------------------------------------
    // Verbs
    // ------------------------------------------------------------------------

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, cache: CachePolicy) -> ApiResult<T> {
        let ttl = match cache {
            CachePolicy::NoCache => None,
            CachePolicy::Default => Some(self.default_ttl),
            CachePolicy::Ttl(ttl) => Some(ttl),
        };
        let request = self.request(Method::GET, endpoint, RequestBody::Empty);
        self.send_json(request, ttl).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: Option<&B>) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, endpoint, json_body(body)?);
        self.send_json(request, None).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: Option<&B>) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::PUT, endpoint, json_body(body)?);
        self.send_json(request, None).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        let request = self.request(Method::DELETE, endpoint, RequestBody::Empty);
        self.send_json(request, None).await
    }

    /// Multipart POST. Never cached; the bearer token is still attached.
    pub async fn upload<T: DeserializeOwned>(&self, endpoint: &str, form: MultipartForm) -> ApiResult<T> {
        let request = self.request(Method::POST, endpoint, RequestBody::Multipart(form));
        let response = self.execute(request).await?;
        if !response.is_success() {
            return Err(ApiError::from_error_body(
                response.status,
                &response.body,
                UPLOAD_FAILED_MESSAGE,
            ));
        }
        decode_bytes(&response)
    }

    /// Raw GET for binary downloads. Never cached.
    pub async fn get_bytes(&self, endpoint: &str) -> ApiResult<Bytes> {
        let request = self.request(Method::GET, endpoint, RequestBody::Empty);
        let response = self.execute(request).await?;
        if !response.is_success() {
            return Err(ApiError::from_error_body(
                response.status,
                &response.body,
                REQUEST_FAILED_MESSAGE,
            ));
        }
        Ok(response.body)
    }

    // ------------------------------------------------------------------------
    // Cache control
    // ------------------------------------------------------------------------

    /// Drop entries whose key contains `pattern`; everything when `None`.
    pub fn invalidate_cache(&self, pattern: Option<&str>) {
        let removed = self.cache.invalidate(pattern);
        debug!(pattern = pattern.unwrap_or("*"), removed, "Cache invalidated");
    }

    pub fn clear_cache(&self) {
        self.invalidate_cache(None);
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn request(&self, method: Method, endpoint: &str, body: RequestBody) -> HttpRequest {
        HttpRequest {
            method,
            url: self.url(endpoint),
            bearer: self.auth.token(),
            body,
        }
    }

    async fn execute(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let method = request.method.clone();
        let url = request.url.clone();
        self.transport.execute(request).await.map_err(|err| {
            warn!(%method, %url, error = %err, "Request did not complete");
            ApiError::network(err.to_string())
        })
    }

    /// Send a JSON request and decode it into `T`, consulting the cache when
    /// `ttl` is set. Only 200 bodies that decode are cached.
    async fn send_json<T: DeserializeOwned>(&self, request: HttpRequest, ttl: Option<Duration>) -> ApiResult<T> {
        let cache_key = ttl.map(|_| request.cache_key());
        if let Some(key) = &cache_key {
            if let Some(value) = self.cache.get(key) {
                debug!(key = %key, "Cache hit");
                return decode(value, 200);
            }
            debug!(key = %key, "Cache miss");
        }

        let response = self.execute(request).await?;
        if !response.is_success() {
            return Err(ApiError::from_error_body(
                response.status,
                &response.body,
                REQUEST_FAILED_MESSAGE,
            ));
        }
        let value: Value = decode_bytes(&response)?;

        match (cache_key, ttl) {
            (Some(key), Some(ttl)) if response.status == 200 => {
                let decoded = decode(value.clone(), response.status)?;
                self.cache.insert(key, value, ttl);
                Ok(decoded)
            }
            _ => decode(value, response.status),
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("default_ttl", &self.default_ttl)
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}

fn json_body<B: Serialize + ?Sized>(body: Option<&B>) -> ApiResult<RequestBody> {
    match body {
        None => Ok(RequestBody::Empty),
        Some(body) => serde_json::to_string(body)
            .map(RequestBody::Json)
            .map_err(|err| ApiError::invalid_payload(0, format!("request body: {}", err))),
    }
}

fn decode_bytes<T: DeserializeOwned>(response: &HttpResponse) -> ApiResult<T> {
    // An empty 2xx body reads as JSON null so unit-like responses still decode.
    let body: &[u8] = if response.body.is_empty() {
        b"null"
    } else {
        &response.body
    };
    serde_json::from_slice(body).map_err(|err| {
        warn!(status = response.status, error = %err, "Response body did not decode");
        ApiError::invalid_payload(response.status, err.to_string())
    })
}

fn decode<T: DeserializeOwned>(value: Value, status: u16) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|err| {
        warn!(status, error = %err, "Response did not match the expected shape");
        ApiError::invalid_payload(status, err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use rukun_core::{ApiErrorKind, ApiResponse, NETWORK_ERROR_MESSAGE};
    use std::sync::Mutex;

    /// Replays one fixed response and records every request.
    struct FixedTransport {
        response: Result<HttpResponse, String>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl FixedTransport {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(HttpResponse::new(status, body)),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: Err("connection refused".to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn last(&self) -> HttpRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            self.response.clone().map_err(TransportError)
        }
    }

    fn client(transport: Arc<FixedTransport>) -> HttpClient {
        let auth = AuthStore::new(Arc::new(MemoryStore::new()));
        HttpClient::new(transport, "https://api.example.com/", auth)
    }

    #[tokio::test]
    async fn unauthenticated_requests_carry_no_bearer() {
        let transport = FixedTransport::new(200, r#"{"success":true,"data":1}"#);
        let http = client(transport.clone());
        let response: ApiResponse<u32> = http.get("/houses/1", CachePolicy::NoCache).await.unwrap();
        assert_eq!(response.data, Some(1));
        let request = transport.last();
        assert_eq!(request.url, "https://api.example.com/houses/1");
        assert!(request.bearer.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cached_get_skips_network_until_ttl_elapses() {
        let transport = FixedTransport::new(200, r#"{"success":true,"data":[1,2]}"#);
        let http = client(transport.clone());
        let ttl = CachePolicy::Ttl(Duration::from_secs(60));

        let _: ApiResponse<Vec<u32>> = http.get("/bills", ttl).await.unwrap();
        let _: ApiResponse<Vec<u32>> = http.get("/bills", ttl).await.unwrap();
        assert_eq!(transport.calls(), 1);

        tokio::time::advance(Duration::from_secs(60)).await;
        let _: ApiResponse<Vec<u32>> = http.get("/bills", ttl).await.unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn uncached_get_always_hits_network() {
        let transport = FixedTransport::new(200, r#"{"success":true}"#);
        let http = client(transport.clone());
        for _ in 0..3 {
            let _: ApiResponse<()> = http.get("/cctv/cameras/1/stream", CachePolicy::NoCache).await.unwrap();
        }
        assert_eq!(transport.calls(), 3);
        assert!(http.cache().is_empty());
    }

    #[tokio::test]
    async fn non_2xx_becomes_rejected_error() {
        let transport = FixedTransport::new(401, r#"{"message":"Invalid credentials"}"#);
        let http = client(transport);
        let err = http
            .post::<ApiResponse<()>, _>("/auth/login", Some(&serde_json::json!({"email": "x"})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Rejected);
        assert_eq!(err.status, 401);
        assert_eq!(err.message, "Invalid credentials");
    }

    #[tokio::test]
    async fn failed_get_is_not_cached() {
        let transport = FixedTransport::new(500, "oops");
        let http = client(transport.clone());
        let err = http.get::<Value>("/bills", CachePolicy::Default).await.unwrap_err();
        assert_eq!(err.message, REQUEST_FAILED_MESSAGE);
        assert!(http.cache().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_status_zero() {
        let http = client(FixedTransport::failing());
        let err = http.delete::<Value>("/reports/1").await.unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.status, 0);
        assert_eq!(err.message, NETWORK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn shape_mismatch_is_flagged_not_coerced() {
        let transport = FixedTransport::new(200, r#"{"success":"yes"}"#);
        let http = client(transport);
        let err = http
            .get::<ApiResponse<u32>>("/admin/stats", CachePolicy::NoCache)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InvalidPayload);
        assert_eq!(err.status, 200);
    }

    #[tokio::test]
    async fn upload_failure_uses_upload_message() {
        let transport = FixedTransport::new(413, "");
        let http = client(transport.clone());
        let err = http
            .upload::<Value>("/users/avatar", MultipartForm::new().text("a", "b"))
            .await
            .unwrap_err();
        assert_eq!(err.status, 413);
        assert_eq!(err.message, UPLOAD_FAILED_MESSAGE);
        assert!(matches!(transport.last().body, RequestBody::Multipart(_)));
    }

    #[tokio::test]
    async fn post_serializes_json_body() {
        let transport = FixedTransport::new(200, r#"{"success":true}"#);
        let http = client(transport.clone());
        let _: ApiResponse<()> = http
            .post("/auth/forgot-password", Some(&serde_json::json!({"email": "a@b.c"})))
            .await
            .unwrap();
        assert_eq!(
            transport.last().body,
            RequestBody::Json(r#"{"email":"a@b.c"}"#.to_string())
        );
        let _: ApiResponse<()> = http.post::<_, ()>("/auth/logout", None).await.unwrap();
        assert_eq!(transport.last().body, RequestBody::Empty);
    }
}
