//! Typed error of the HTTP boundary.
//!
//! Every failed request surfaces as an [`ApiError`]. The `status` field is the
//! quickest discriminator: `0` means the request never reached the server,
//! anything else is the HTTP status the server answered with.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when a request never completed.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error occurred";

/// Message used when a rejected request carries no readable message.
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";

/// Message used when a rejected upload carries no readable message.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";

/// Message used when a successful response does not match its declared shape.
pub const INVALID_PAYLOAD_MESSAGE: &str = "Invalid response payload";

/// Category of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiErrorKind {
    /// The server answered with a non-2xx status.
    Rejected,
    /// The request never completed (connection refused, DNS, TLS, ...).
    Network,
    /// The server answered 2xx but the body did not decode.
    InvalidPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: u16,
    pub message: String,
    pub errors: Option<Vec<String>>,
    /// Underlying failure text, for logs only.
    pub detail: Option<String>,
}

/// Error body the server sends with non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

impl ApiError {
    pub fn rejected(status: u16, message: impl Into<String>, errors: Option<Vec<String>>) -> Self {
        Self {
            kind: ApiErrorKind::Rejected,
            status,
            message: message.into(),
            errors,
            detail: None,
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            status: 0,
            message: NETWORK_ERROR_MESSAGE.to_string(),
            errors: None,
            detail: Some(detail.into()),
        }
    }

    pub fn invalid_payload(status: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::InvalidPayload,
            status,
            message: INVALID_PAYLOAD_MESSAGE.to_string(),
            errors: None,
            detail: Some(detail.into()),
        }
    }

    /// Build a rejection from a raw error body.
    ///
    /// An unreadable body counts as an empty one: the status is kept and the
    /// `fallback` message is used.
    pub fn from_error_body(status: u16, body: &[u8], fallback: &str) -> Self {
        let parsed = serde_json::from_slice::<ErrorBody>(body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Self::rejected(status, message, parsed.errors)
    }

    pub fn is_network(&self) -> bool {
        self.kind == ApiErrorKind::Network
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Rejected && self.status == 401
    }

    pub fn field_errors(&self) -> &[String] {
        self.errors.as_deref().unwrap_or(&[])
    }
}

/// Result alias for data-access operations.
pub type ApiResult<T> = Result<T, ApiError>;
