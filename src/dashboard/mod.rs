//! Dashboard API: bot configuration, document ingestion, keyed chat
//!
//! Every call follows the same pattern: a non-2xx response becomes an
//! [`ApiError`] carrying the status and the response body, a 2xx response
//! is decoded as JSON into the typed result.

use crate::api::{ApiError, AskRequest, ChatResponse};
use crate::config::DashboardSettings;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Current LLM configuration of the bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub has_api_key: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfigEnvelope {
    pub success: bool,
    pub data: BotConfig,
}

/// New LLM configuration for the bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfigUpdate {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub success: bool,
    pub message: String,
}

/// Result of ingesting one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub chunks_created: Option<u32>,
}

/// An indexed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_id: String,
    pub source: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentList {
    pub items: Vec<DocumentSummary>,
}

/// Client for the dashboard endpoints
pub struct DashboardClient {
    settings: DashboardSettings,
    client: Client,
}

impl DashboardClient {
    pub fn new(settings: DashboardSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(network_error)?;
        Ok(Self { settings, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    /// Fetch the bot's provider/model configuration
    pub async fn fetch_bot_config(&self) -> Result<BotConfigEnvelope, ApiError> {
        self.execute(self.client.get(self.url("/api/chatbot/config"))).await
    }

    /// Replace the bot's provider/model configuration
    pub async fn update_bot_config(&self, update: &BotConfigUpdate) -> Result<StatusMessage, ApiError> {
        self.execute(self.client.put(self.url("/api/chatbot/config")).json(update))
            .await
    }

    /// Upload a document for ingestion
    pub async fn upload_document(&self, path: &Path) -> Result<UploadResult, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::new(0, format!("Failed to read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        debug!(file = %file_name, bytes = bytes.len(), "uploading document");
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        self.execute(self.client.post(self.url("/ingest")).multipart(form))
            .await
    }

    /// List indexed documents
    pub async fn list_documents(&self) -> Result<DocumentList, ApiError> {
        self.execute(self.client.get(self.url("/ingest/documents"))).await
    }

    /// Ask the bot through the API-key authenticated endpoint
    pub async fn ask(&self, request: &AskRequest) -> Result<ChatResponse, ApiError> {
        let mut builder = self.client.post(self.url("/chat")).json(request);
        if let Some(key) = &self.settings.api_key {
            builder = builder.header("x-api-key", key);
        }
        self.execute(builder).await
    }

    async fn execute<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, ApiError> {
        let response = request.send().await.map_err(network_error)?;
        decode_response(response).await
    }
}

async fn decode_response<R: DeserializeOwned>(response: Response) -> Result<R, ApiError> {
    let status = response.status();
    let text = response.text().await.map_err(network_error)?;

    if !status.is_success() {
        return Err(error_from_body(status.as_u16(), &text));
    }

    serde_json::from_str(&text)
        .map_err(|e| ApiError::new(0, format!("Invalid response payload: {}", e)))
}

/// Error for a non-2xx response: the body if there is one, else a generic line
pub fn error_from_body(status: u16, body: &str) -> ApiError {
    if body.trim().is_empty() {
        ApiError::new(status, format!("Request failed with status {}", status))
    } else {
        ApiError::new(status, body)
    }
}

fn network_error(err: reqwest::Error) -> ApiError {
    ApiError::new(0, format!("Network error: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = DashboardClient::new(DashboardSettings {
            base_url: "http://dash.test/".to_string(),
            ..DashboardSettings::default()
        })
        .unwrap();
        assert_eq!(client.url("/ingest"), "http://dash.test/ingest");
    }

    #[test]
    fn test_error_from_body() {
        assert_eq!(error_from_body(400, "bad file"), ApiError::new(400, "bad file"));
        assert_eq!(
            error_from_body(503, ""),
            ApiError::new(503, "Request failed with status 503")
        );
    }

    #[test]
    fn test_parse_bot_config() {
        let json = r#"{"success":true,"data":{"provider":null,"model":null,"has_api_key":false}}"#;
        let envelope: BotConfigEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        assert!(envelope.data.provider.is_none());
        assert!(!envelope.data.has_api_key);
    }

    #[test]
    fn test_parse_upload_and_documents() {
        let upload: UploadResult =
            serde_json::from_str(r#"{"success":true,"message":"ok","chunks_created":4}"#).unwrap();
        assert_eq!(upload.chunks_created, Some(4));
        assert!(upload.document_id.is_none());

        let list: DocumentList = serde_json::from_str(
            r#"{"items":[{"document_id":"d1","source":"faq.pdf","created_at":"2024-01-01"}]}"#,
        )
        .unwrap();
        assert_eq!(list.items[0].source, "faq.pdf");
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let client = DashboardClient::new(DashboardSettings::default()).unwrap();
        let err = client
            .upload_document(Path::new("/definitely/not/here.pdf"))
            .await
            .unwrap_err();
        assert_eq!(err.status, 0);
        assert!(err.message.contains("Failed to read"));
    }
}
