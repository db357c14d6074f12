use crate::http::{CachePolicy, HttpClient};
use rukun_core::{
    AdminStats, ApiResponse, ApiResult, Bill, CreateBillRequest, ListQuery, Paginated, Report,
    UpdateUserStatusRequest, User,
};
use std::time::Duration;

pub const ADMIN_STATS_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Clone, Copy, Debug)]
pub struct AdminApi<'a> {
    http: &'a HttpClient,
}

impl<'a> AdminApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_all_reports(&self, query: &ListQuery) -> ApiResult<ApiResponse<Paginated<Report>>> {
        let endpoint = format!("/admin/reports{}", query.to_query_string());
        self.http.get(&endpoint, CachePolicy::Default).await
    }

    pub async fn get_all_users(&self, query: &ListQuery) -> ApiResult<ApiResponse<Paginated<User>>> {
        let endpoint = format!("/admin/users{}", query.to_query_string());
        self.http.get(&endpoint, CachePolicy::Default).await
    }

    pub async fn update_user_status(&self, user_id: &str, is_active: bool) -> ApiResult<ApiResponse<User>> {
        let body = UpdateUserStatusRequest { is_active };
        let response = self
            .http
            .put(&format!("/admin/users/{}/status", user_id), Some(&body))
            .await?;
        self.http.invalidate_cache(Some("/admin/users"));
        Ok(response)
    }

    pub async fn get_stats(&self) -> ApiResult<ApiResponse<AdminStats>> {
        self.http
            .get("/admin/stats", CachePolicy::Ttl(ADMIN_STATS_TTL))
            .await
    }

    /// Issue a bill to a house. Resident-facing `/bills` reads are dropped.
    pub async fn create_bill(&self, request: &CreateBillRequest) -> ApiResult<ApiResponse<Bill>> {
        let response = self.http.post("/admin/bills", Some(request)).await?;
        self.http.invalidate_cache(Some("/bills"));
        Ok(response)
    }
}
