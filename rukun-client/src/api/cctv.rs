use crate::http::{CachePolicy, HttpClient};
use chrono::NaiveDate;
use rukun_core::{ApiResponse, ApiResult, Camera, CameraStream, Recordings};

#[derive(Clone, Copy, Debug)]
pub struct CctvApi<'a> {
    http: &'a HttpClient,
}

impl<'a> CctvApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_cameras(&self) -> ApiResult<ApiResponse<Vec<Camera>>> {
        self.http.get("/cctv/cameras", CachePolicy::Default).await
    }

    pub async fn get_camera(&self, id: &str) -> ApiResult<ApiResponse<Camera>> {
        self.http
            .get(&format!("/cctv/cameras/{}", id), CachePolicy::Default)
            .await
    }

    /// Stream URLs carry short-lived credentials and are never cached.
    pub async fn get_camera_stream(&self, id: &str) -> ApiResult<ApiResponse<CameraStream>> {
        self.http
            .get(&format!("/cctv/cameras/{}/stream", id), CachePolicy::NoCache)
            .await
    }

    pub async fn get_recordings(&self, camera_id: &str, date: NaiveDate) -> ApiResult<ApiResponse<Recordings>> {
        let endpoint = format!(
            "/cctv/cameras/{}/recordings?date={}",
            camera_id,
            date.format("%Y-%m-%d")
        );
        self.http.get(&endpoint, CachePolicy::Default).await
    }
}
