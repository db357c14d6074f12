use crate::http::{CachePolicy, HttpClient};
use crate::transport::MultipartForm;
use rukun_core::{
    ApiResponse, ApiResult, CreateReportRequest, ListQuery, Paginated, Report,
    UpdateReportStatusRequest,
};

/// Also matches `/admin/reports`.
const NAMESPACE: &str = "/reports";

#[derive(Clone, Copy, Debug)]
pub struct ReportsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> ReportsApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn get_reports(&self, query: &ListQuery) -> ApiResult<ApiResponse<Paginated<Report>>> {
        let endpoint = format!("/reports{}", query.to_query_string());
        self.http.get(&endpoint, CachePolicy::Default).await
    }

    pub async fn get_report(&self, id: &str) -> ApiResult<ApiResponse<Report>> {
        self.http.get(&format!("/reports/{}", id), CachePolicy::Default).await
    }

    pub async fn create_report(&self, request: CreateReportRequest) -> ApiResult<ApiResponse<Report>> {
        let response = self.http.upload("/reports", report_form(request)).await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        Ok(response)
    }

    pub async fn update_report_status(
        &self,
        id: &str,
        request: &UpdateReportStatusRequest,
    ) -> ApiResult<ApiResponse<Report>> {
        let response = self
            .http
            .put(&format!("/reports/{}/status", id), Some(request))
            .await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        Ok(response)
    }

    pub async fn delete_report(&self, id: &str) -> ApiResult<ApiResponse<()>> {
        let response = self.http.delete(&format!("/reports/{}", id)).await?;
        self.http.invalidate_cache(Some(NAMESPACE));
        Ok(response)
    }
}

fn report_form(request: CreateReportRequest) -> MultipartForm {
    MultipartForm::new()
        .text("category", request.category.as_str())
        .text("title", request.title)
        .text("description", request.description)
        .text("priority", request.priority.as_str())
        .text_opt("location", request.location.filter(|l| !l.is_empty()))
        .indexed_files("images", &request.images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FormField;
    use rukun_core::{Attachment, ReportCategory, ReportPriority};

    #[test]
    fn report_form_layout() {
        let form = report_form(CreateReportRequest {
            category: ReportCategory::Maintenance,
            title: "Lampu jalan mati".to_string(),
            description: "Gang 3 gelap sejak Senin".to_string(),
            location: Some("Gang 3".to_string()),
            priority: ReportPriority::High,
            images: vec![Attachment::new("a.jpg", vec![1, 2])],
        });
        let names: Vec<&str> = form.fields().iter().map(FormField::name).collect();
        assert_eq!(
            names,
            ["category", "title", "description", "priority", "location", "images[0]"]
        );
        assert_eq!(form.text_value("category"), Some("maintenance"));
        assert_eq!(form.text_value("priority"), Some("high"));
    }

    #[test]
    fn empty_location_is_omitted() {
        let form = report_form(CreateReportRequest {
            category: ReportCategory::Security,
            title: "t".to_string(),
            description: "d".to_string(),
            location: Some(String::new()),
            priority: ReportPriority::Low,
            images: Vec::new(),
        });
        assert_eq!(form.fields().len(), 4);
        assert_eq!(form.text_value("location"), None);
    }
}
