//! Transport seam between the chat client and the network

use super::SessionError;
use crate::config::WidgetSettings;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

/// Body of a response, read chunk by chunk
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, SessionError>> + Send>>;

/// Status line and body of a response
pub struct TransportResponse {
    pub status: u16,
    pub body: Option<ByteStream>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Read the whole body into a string.
    pub async fn text(self) -> Result<String, SessionError> {
        let mut body = self.body.ok_or(SessionError::MissingBody)?;
        let mut bytes = Vec::new();
        while let Some(chunk) = body.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .finish()
    }
}

/// Anything that can POST a JSON body and hand back a streamed response
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the request. Errors only when no response was received at all.
    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, SessionError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(settings: &WidgetSettings) -> Result<Self, SessionError> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs));

        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, SessionError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        debug!(url, status, "response received");

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| SessionError::Read(e.to_string())));

        Ok(TransportResponse {
            status,
            body: Some(Box::pin(body)),
        })
    }
}
