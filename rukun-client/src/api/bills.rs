use crate::http::{CachePolicy, HttpClient};
use rukun_core::{ApiResponse, ApiResult, Bill, ListQuery, PayBillRequest, Payment};

const NAMESPACE: &str = "/bills";

#[derive(Clone, Copy, Debug)]
pub struct BillsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> BillsApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_bills(&self, query: &ListQuery) -> ApiResult<ApiResponse<Vec<Bill>>> {
        let endpoint = format!("/bills{}", query.to_query_string());
        self.http.get(&endpoint, CachePolicy::Default).await
    }

    pub async fn get_bill(&self, id: &str) -> ApiResult<ApiResponse<Bill>> {
        self.http.get(&format!("/bills/{}", id), CachePolicy::Default).await
    }

    /// Pay a bill. Every cached `/bills` read is dropped once the server
    /// accepts the payment.
    pub async fn pay_bill(&self, request: &PayBillRequest) -> ApiResult<ApiResponse<Payment>> {
        let response = self.http.post("/bills/pay", Some(request)).await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        Ok(response)
    }
}
