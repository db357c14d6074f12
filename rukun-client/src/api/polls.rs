use crate::http::{CachePolicy, HttpClient};
use rukun_core::{
    ApiResponse, ApiResult, CreatePollRequest, EntityId, ListQuery, Paginated, Poll, Vote,
    VoteRequest,
};

const NAMESPACE: &str = "/polls";

#[derive(Clone, Copy, Debug)]
pub struct PollsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> PollsApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_polls(&self, query: &ListQuery) -> ApiResult<ApiResponse<Paginated<Poll>>> {
        let endpoint = format!("/polls{}", query.to_query_string());
        self.http.get(&endpoint, CachePolicy::Default).await
    }

    pub async fn get_poll(&self, id: &str) -> ApiResult<ApiResponse<Poll>> {
        self.http.get(&format!("/polls/{}", id), CachePolicy::Default).await
    }

    pub async fn create_poll(&self, request: &CreatePollRequest) -> ApiResult<ApiResponse<Poll>> {
        let response = self.http.post("/polls", Some(request)).await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        Ok(response)
    }

    /// Cast a vote. Cached results for every poll are dropped.
    pub async fn vote(&self, poll_id: &str, selected_options: Vec<EntityId>) -> ApiResult<ApiResponse<Vote>> {
        let body = VoteRequest { selected_options };
        let response = self
            .http
            .post(&format!("/polls/{}/vote", poll_id), Some(&body))
            .await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        Ok(response)
    }

    pub async fn get_results(&self, poll_id: &str) -> ApiResult<ApiResponse<Poll>> {
        self.http
            .get(&format!("/polls/{}/results", poll_id), CachePolicy::Default)
            .await
    }
}
