use crate::llm::ReportClient;
use crate::model::{ApiResponse, ReportData};
use crate::report::clean_report_html;

/// Runs the report client and post-processes successful output.
#[derive(Clone)]
pub struct ReportGenerator {
    client: ReportClient,
}

impl ReportGenerator {
    pub fn new(client: ReportClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ReportClient {
        &self.client
    }

    /// Generate a report whose `data` is display-ready, sanitized HTML.
    pub async fn generate(&self, data: &ReportData) -> ApiResponse {
        let response = self.client.generate_report(data).await;
        match response.data {
            Some(raw) if response.success => {
                let html = clean_report_html(&raw);
                tracing::debug!(raw_bytes = raw.len(), html_bytes = html.len(), "Report cleaned");
                ApiResponse::ok(html)
            }
            _ => response,
        }
    }
}
