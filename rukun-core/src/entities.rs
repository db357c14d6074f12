//! Domain records mirrored from the server.
//!
//! Records are immutable snapshots: the client never edits them in place
//! except for the signed-in [`User`], which is merged through [`UserPatch`].

use crate::enums::*;
use crate::{EntityId, Rupiah, Timestamp};
use serde::{Deserialize, Serialize};

// ============================================================================
// USERS AND HOUSES
// ============================================================================

/// A registered member of the neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub house_id: EntityId,
    pub house_name: String,
    pub block_number: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial user record. Absent fields are left untouched by [`UserPatch::apply`]
/// and omitted from the JSON body of a profile update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge every present field into `user`.
    pub fn apply(&self, user: &mut User) {
        fn merge<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        merge(&mut user.id, &self.id);
        merge(&mut user.email, &self.email);
        merge(&mut user.name, &self.name);
        merge(&mut user.phone, &self.phone);
        merge(&mut user.role, &self.role);
        merge(&mut user.house_id, &self.house_id);
        merge(&mut user.house_name, &self.house_name);
        merge(&mut user.block_number, &self.block_number);
        merge(&mut user.is_active, &self.is_active);
        merge(&mut user.created_at, &self.created_at);
        merge(&mut user.updated_at, &self.updated_at);
        if self.avatar.is_some() {
            user.avatar = self.avatar.clone();
        }
    }
}

impl From<User> for UserPatch {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id),
            email: Some(user.email),
            name: Some(user.name),
            phone: Some(user.phone),
            role: Some(user.role),
            house_id: Some(user.house_id),
            house_name: Some(user.house_name),
            block_number: Some(user.block_number),
            is_active: Some(user.is_active),
            avatar: user.avatar,
            created_at: Some(user.created_at),
            updated_at: Some(user.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub id: EntityId,
    pub block_number: String,
    pub house_number: String,
    /// Lot area in square meters.
    pub area: f64,
    pub owner_name: String,
    pub owner_email: String,
    pub resident_count: u32,
    pub status: HouseStatus,
    pub created_at: Timestamp,
}

// ============================================================================
// BILLS AND PAYMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: EntityId,
    pub house_id: EntityId,
    #[serde(rename = "type")]
    pub bill_type: BillType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: Rupiah,
    pub due_date: Timestamp,
    pub status: BillStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: EntityId,
    pub bill_id: EntityId,
    pub amount: Rupiah,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub payment_date: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ============================================================================
// REPORTS AND DOCUMENTS
// ============================================================================

/// A resident's complaint or maintenance request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: EntityId,
    pub user_id: EntityId,
    pub category: ReportCategory,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub priority: ReportPriority,
    pub status: ReportStatus,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: EntityId,
    pub user_id: EntityId,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub title: String,
    pub content: String,
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub id: EntityId,
    pub name: String,
    pub content: String,
}

// ============================================================================
// ANNOUNCEMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: EntityId,
    pub author_id: EntityId,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub category: AnnouncementCategory,
    pub priority: AnnouncementPriority,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    pub target_audience: TargetAudience,
    #[serde(default)]
    pub target_blocks: Vec<String>,
    #[serde(default)]
    pub read_by: Vec<EntityId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ============================================================================
// CCTV
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    pub id: EntityId,
    pub name: String,
    pub location: String,
    pub stream_url: String,
    pub is_active: bool,
    #[serde(rename = "type")]
    pub camera_type: CameraType,
    pub quality: CameraQuality,
    pub has_night_vision: bool,
    pub has_audio: bool,
    pub last_online: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraStream {
    pub stream_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recordings {
    pub recordings: Vec<String>,
}

// ============================================================================
// POLLS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: EntityId,
    pub creator_id: EntityId,
    pub title: String,
    pub description: String,
    pub options: Vec<PollOption>,
    #[serde(rename = "type")]
    pub poll_type: PollType,
    pub is_anonymous: bool,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub status: PollStatus,
    #[serde(default)]
    pub eligible_voters: Vec<EntityId>,
    pub total_votes: u32,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: EntityId,
    pub text: String,
    pub votes: u32,
    /// Empty for anonymous polls.
    #[serde(default)]
    pub voters: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: EntityId,
    pub poll_id: EntityId,
    pub user_id: EntityId,
    pub selected_options: Vec<EntityId>,
    pub voted_at: Timestamp,
}

// ============================================================================
// UPLOAD RESULTS AND ADMIN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarUpload {
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptUpload {
    pub receipt_url: String,
}

/// Dashboard counters for administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: u64,
    pub total_houses: u64,
    pub pending_reports: u64,
    pub total_revenue: f64,
    pub monthly_growth: f64,
}
