use crate::http::{CachePolicy, HttpClient};
use bytes::Bytes;
use rukun_core::{
    ApiResponse, ApiResult, CreateDocumentRequest, Document, DocumentTemplate, ListQuery,
    Paginated, UpdateDocumentRequest,
};
use std::time::Duration;

const NAMESPACE: &str = "/documents";

/// Templates are edited by hand on the server and almost never change.
pub const TEMPLATES_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Clone, Copy, Debug)]
pub struct DocumentsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> DocumentsApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_documents(&self, query: &ListQuery) -> ApiResult<ApiResponse<Paginated<Document>>> {
        let endpoint = format!("/documents{}", query.to_query_string());
        self.http.get(&endpoint, CachePolicy::Default).await
    }

    pub async fn get_document(&self, id: &str) -> ApiResult<ApiResponse<Document>> {
        self.http.get(&format!("/documents/{}", id), CachePolicy::Default).await
    }

    pub async fn create_document(&self, request: &CreateDocumentRequest) -> ApiResult<ApiResponse<Document>> {
        let response = self.http.post("/documents", Some(request)).await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        Ok(response)
    }

    pub async fn update_document(
        &self,
        id: &str,
        request: &UpdateDocumentRequest,
    ) -> ApiResult<ApiResponse<Document>> {
        let response = self
            .http
            .put(&format!("/documents/{}", id), Some(request))
            .await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        Ok(response)
    }

    /// Raw file contents of a generated document.
    pub async fn download_document(&self, id: &str) -> ApiResult<Bytes> {
        self.http.get_bytes(&format!("/documents/{}/download", id)).await
    }

    pub async fn get_templates(&self) -> ApiResult<ApiResponse<Vec<DocumentTemplate>>> {
        self.http
            .get("/documents/templates", CachePolicy::Ttl(TEMPLATES_TTL))
            .await
    }
}
