use crate::http::{CachePolicy, HttpClient};
use crate::transport::MultipartForm;
use rukun_core::{ApiResponse, ApiResult, Attachment, ListQuery, Paginated, Payment, ReceiptUpload};

const NAMESPACE: &str = "/payments";

#[derive(Clone, Copy, Debug)]
pub struct PaymentsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> PaymentsApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_payment_history(&self, query: &ListQuery) -> ApiResult<ApiResponse<Paginated<Payment>>> {
        let endpoint = format!("/payments/history{}", query.to_query_string());
        self.http.get(&endpoint, CachePolicy::Default).await
    }

    pub async fn get_payment(&self, id: &str) -> ApiResult<ApiResponse<Payment>> {
        self.http.get(&format!("/payments/{}", id), CachePolicy::Default).await
    }

    pub async fn upload_receipt(&self, payment_id: &str, file: Attachment) -> ApiResult<ApiResponse<ReceiptUpload>> {
        let form = MultipartForm::new().file("receipt", file);
        let response = self
            .http
            .upload(&format!("/payments/{}/receipt", payment_id), form)
            .await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        Ok(response)
    }
}
