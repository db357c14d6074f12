use crate::http::{CachePolicy, HttpClient};
use rukun_core::{ApiResponse, ApiResult, House, ListQuery, Paginated};
use std::time::Duration;

/// The house register changes rarely.
pub const HOUSES_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Clone, Copy, Debug)]
pub struct HousesApi<'a> {
    http: &'a HttpClient,
}

impl<'a> HousesApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_houses(&self, query: &ListQuery) -> ApiResult<ApiResponse<Paginated<House>>> {
        let endpoint = format!("/houses{}", query.to_query_string());
        self.http.get(&endpoint, CachePolicy::Ttl(HOUSES_TTL)).await
    }

    pub async fn get_house(&self, id: &str) -> ApiResult<ApiResponse<House>> {
        self.http.get(&format!("/houses/{}", id), CachePolicy::Default).await
    }
}
