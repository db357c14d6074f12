//! Response envelopes returned by every REST endpoint.

use crate::entities::User;
use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// Standard wrapper: `{ success, data?, message?, errors? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    /// The payload, only when the server reported success.
    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Body of `/auth/login` and `/auth/refresh`.
///
/// A failed login may omit the session fields, so they are optional here and
/// [`LoginResponse::session`] only yields a pair when everything is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LoginResponse {
    pub fn session(&self) -> Option<(&str, &User)> {
        if !self.success {
            return None;
        }
        match (&self.token, &self.user) {
            (Some(token), Some(user)) => Some((token.as_str(), user)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_data_decodes_as_none() {
        let response: ApiResponse<()> =
            serde_json::from_str(r#"{"success":true,"data":null}"#).unwrap();
        assert!(response.success);
        assert!(response.data.is_none());
    }

    #[test]
    fn missing_success_is_rejected() {
        let result = serde_json::from_str::<ApiResponse<u32>>(r#"{"data":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn failed_response_yields_no_data() {
        let response = ApiResponse {
            success: false,
            data: Some(7u32),
            message: Some("nope".to_string()),
            errors: None,
        };
        assert_eq!(response.into_data(), None);
    }

    #[test]
    fn pagination_reports_next_page() {
        let page: Paginated<u32> = serde_json::from_str(
            r#"{"data":[1,2],"total":12,"page":1,"limit":10,"totalPages":2}"#,
        )
        .unwrap();
        assert!(page.has_next_page());
        assert_eq!(page.data, vec![1, 2]);
    }

    #[test]
    fn unsuccessful_login_has_no_session() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"success":false,"message":"Invalid credentials"}"#).unwrap();
        assert!(response.session().is_none());
    }
}
