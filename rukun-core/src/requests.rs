//! Request bodies and list parameters.

use crate::enums::*;
use crate::{EntityId, Rupiah, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// LIST PARAMETERS
// ============================================================================

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Pagination and status filter folded into a list endpoint's query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub status: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            status: None,
        }
    }
}

impl ListQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl fmt::Display) -> Self {
        self.status = Some(status.to_string());
        self
    }

    /// `?page=P&limit=L[&status=S]`, status percent-encoded.
    pub fn to_query_string(&self) -> String {
        let mut query = format!("?page={}&limit={}", self.page, self.limit);
        if let Some(status) = &self.status {
            query.push_str("&status=");
            query.push_str(&urlencoding::encode(status));
        }
        query
    }
}

// ============================================================================
// FILE ATTACHMENTS
// ============================================================================

/// A file sent as one part of a multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

// ============================================================================
// AUTH AND USERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchHouseRequest {
    pub house_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserStatusRequest {
    pub is_active: bool,
}

// ============================================================================
// BILLS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayBillRequest {
    pub bill_id: EntityId,
    pub payment_method: PaymentMethod,
    pub amount: Rupiah,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillRequest {
    pub house_id: EntityId,
    #[serde(rename = "type")]
    pub bill_type: BillType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: Rupiah,
    pub due_date: Timestamp,
}

// ============================================================================
// REPORTS
// ============================================================================

/// New report. Sent as multipart form data, never as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReportRequest {
    pub category: ReportCategory,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub priority: ReportPriority,
    pub images: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReportStatusRequest {
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

// ============================================================================
// DOCUMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<EntityId>,
}

/// Partial document update; absent fields are omitted from the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<EntityId>,
}

// ============================================================================
// ANNOUNCEMENTS
// ============================================================================

/// New announcement. Sent as multipart form data, never as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub content: String,
    pub category: AnnouncementCategory,
    pub priority: AnnouncementPriority,
    pub target_audience: TargetAudience,
    pub target_blocks: Option<Vec<String>>,
    pub expires_at: Option<Timestamp>,
    pub images: Vec<Attachment>,
}

// ============================================================================
// POLLS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    #[serde(rename = "type")]
    pub poll_type: PollType,
    pub is_anonymous: bool,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub eligible_voters: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub selected_options: Vec<EntityId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_query_is_first_page_of_ten() {
        assert_eq!(ListQuery::default().to_query_string(), "?page=1&limit=10");
    }

    #[test]
    fn status_is_appended_last() {
        let query = ListQuery::new(2, 25).with_status(ReportStatus::InProgress);
        assert_eq!(query.to_query_string(), "?page=2&limit=25&status=in_progress");
    }

    #[test]
    fn pay_bill_body_matches_wire_names() {
        let body = PayBillRequest {
            bill_id: "2".to_string(),
            payment_method: PaymentMethod::BankTransfer,
            amount: 50_000,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"billId": "2", "paymentMethod": "bank_transfer", "amount": 50000})
        );
    }

    #[test]
    fn attachment_debug_hides_contents() {
        let file = Attachment::new("photo.jpg", vec![0u8; 2048]).with_content_type("image/jpeg");
        let rendered = format!("{:?}", file);
        assert!(rendered.contains("len: 2048"));
        assert!(!rendered.contains("bytes"));
    }

    proptest! {
        #[test]
        fn status_never_breaks_the_query_string(status in "[ -~]{1,24}") {
            let query = ListQuery::default().with_status(&status).to_query_string();
            let tail = query.split("&status=").nth(1).unwrap_or_default();
            prop_assert!(!tail.contains('&'));
            prop_assert!(!tail.contains(' '));
            prop_assert_eq!(urlencoding::decode(tail).unwrap(), status);
        }
    }
}
