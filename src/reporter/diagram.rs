//! Diagram service client and reporter
//!
//! Asks the external diagramming service to create one diagram per scan.
//! The service's reply is logged and otherwise ignored.

use crate::reporter::{ReportError, Reporter, ScanReport};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const CREATE_DIAGRAM_PATH: &str = "/diagrams/create.json";
pub const DEFAULT_BASE_URL: &str = "https://cacoo.com/api/v1";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Subset of the service's diagram description that gets logged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramResponse {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub diagram_id: String,
    #[serde(default)]
    pub title: String,
}

/// Minimal client for the diagram-creation endpoint
#[derive(Clone)]
pub struct DiagramClient {
    api_key: String,
    folder_id: String,
    endpoint: reqwest::Url,
    http: reqwest::Client,
}

impl std::fmt::Debug for DiagramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("folder_id", &self.folder_id)
            .finish_non_exhaustive()
    }
}

impl DiagramClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        folder_id: impl Into<String>,
    ) -> Result<Self, ReportError> {
        let raw = format!("{}{}", base_url.trim_end_matches('/'), CREATE_DIAGRAM_PATH);
        let endpoint = reqwest::Url::parse(&raw).map_err(|e| ReportError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("depweight/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_key: api_key.into(),
            folder_id: folder_id.into(),
            endpoint,
            http,
        })
    }

    /// Build, but do not send, a create request
    pub fn build_request(&self, title: &str, description: &str) -> Result<reqwest::Request, ReportError> {
        let request = self
            .http
            .get(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("folderId", self.folder_id.as_str()),
                ("title", title),
                ("description", description),
                ("security", "public"),
            ])
            .build()?;
        Ok(request)
    }

    pub async fn create_diagram(
        &self,
        title: &str,
        description: &str,
    ) -> Result<DiagramResponse, ReportError> {
        let request = self.build_request(title, description)?;
        let response = self.http.execute(request).await?;

        let status = response.status().as_u16();
        if status > 200 {
            return Err(ReportError::Status { status });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ReportError::InvalidResponse {
            message: e.to_string(),
        })
    }
}

/// Creates a diagram per completed scan
pub struct DiagramReporter {
    client: DiagramClient,
}

impl DiagramReporter {
    pub fn new(client: DiagramClient) -> Self {
        Self { client }
    }

    pub fn title(report: &ScanReport) -> String {
        format!("{} import weights", report.job.folder)
    }

    pub fn description(report: &ScanReport) -> String {
        format!(
            "{} edges ({} imports) across {} files of {}",
            report.weights.len(),
            report.weights.total(),
            report.packages,
            report.job.url
        )
    }
}

#[async_trait]
impl Reporter for DiagramReporter {
    fn name(&self) -> &str {
        "diagram"
    }

    async fn emit(&self, report: &ScanReport) -> Result<(), ReportError> {
        let diagram = self
            .client
            .create_diagram(&Self::title(report), &Self::description(report))
            .await?;
        log::info!(
            "diagram '{}' created for {} ({})",
            diagram.title,
            report.job.folder,
            diagram.url
        );
        Ok(())
    }
}
