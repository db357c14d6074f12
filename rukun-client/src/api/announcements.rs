use crate::http::{CachePolicy, HttpClient};
use crate::transport::MultipartForm;
use chrono::SecondsFormat;
use rukun_core::{
    Announcement, ApiResponse, ApiResult, CreateAnnouncementRequest, ListQuery, Paginated,
};
use serde_json::Value;

const NAMESPACE: &str = "/announcements";

#[derive(Clone, Copy, Debug)]
pub struct AnnouncementsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> AnnouncementsApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_announcements(&self, query: &ListQuery) -> ApiResult<ApiResponse<Paginated<Announcement>>> {
        let endpoint = format!("/announcements{}", query.to_query_string());
        self.http.get(&endpoint, CachePolicy::Default).await
    }

    pub async fn get_announcement(&self, id: &str) -> ApiResult<ApiResponse<Announcement>> {
        self.http
            .get(&format!("/announcements/{}", id), CachePolicy::Default)
            .await
    }

    pub async fn create_announcement(
        &self,
        request: CreateAnnouncementRequest,
    ) -> ApiResult<ApiResponse<Announcement>> {
        let response = self
            .http
            .upload("/announcements", announcement_form(request))
            .await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        Ok(response)
    }

    /// Mark an announcement read by the signed-in user. Cached lists carry
    /// `readBy`, so they are dropped too.
    pub async fn mark_as_read(&self, id: &str) -> ApiResult<ApiResponse<()>> {
        let response = self
            .http
            .post::<_, ()>(&format!("/announcements/{}/read", id), None)
            .await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        Ok(response)
    }
}

fn announcement_form(request: CreateAnnouncementRequest) -> MultipartForm {
    // targetBlocks travels as a JSON array inside a text field.
    let target_blocks = request
        .target_blocks
        .map(|blocks| Value::from(blocks).to_string());
    let expires_at = request
        .expires_at
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true));

    MultipartForm::new()
        .text("title", request.title)
        .text("content", request.content)
        .text("category", request.category.as_str())
        .text("priority", request.priority.as_str())
        .text("targetAudience", request.target_audience.as_str())
        .text_opt("targetBlocks", target_blocks)
        .text_opt("expiresAt", expires_at)
        .indexed_files("images", &request.images)
}
