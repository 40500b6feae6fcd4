//! Widget chat client: paced streaming sends and one-shot requests

use super::decoder::Fragment;
use super::request::ChatRequest;
use super::response::ChatResponse;
use super::session::RequestSession;
use super::streaming::SendOptions;
use super::transport::{ChatTransport, HttpTransport, TransportResponse};
use super::{ApiError, SessionError};
use crate::config::WidgetSettings;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

/// Client for one widget's chat endpoints
pub struct ChatClient<T = HttpTransport> {
    transport: T,
    settings: WidgetSettings,
}

impl ChatClient<HttpTransport> {
    /// Build a client backed by reqwest.
    pub fn new(settings: WidgetSettings) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&settings)?;
        Ok(Self::with_transport(transport, settings))
    }
}

impl<T: ChatTransport> ChatClient<T> {
    pub fn with_transport(transport: T, settings: WidgetSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &WidgetSettings {
        &self.settings
    }

    /// Endpoint for streamed answers
    pub fn stream_url(&self) -> String {
        format!("{}/stream", self.chat_url())
    }

    /// Endpoint for complete answers
    pub fn chat_url(&self) -> String {
        format!(
            "{}/chat/widget/{}/chat",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.widget_id
        )
    }

    /// Options carrying the configured pacing delay
    pub fn default_options(&self) -> SendOptions {
        SendOptions::new().with_delay_ms(self.settings.delay_ms)
    }

    /// Send `content` and hand each fragment of the answer to `on_chunk`.
    ///
    /// Fragments arrive in wire order. With a non-zero `options.delay` each
    /// delivery waits that long first, while the body keeps being read in
    /// the meantime. Resolves once the transport reports end of stream and
    /// every fragment has been delivered.
    pub async fn send<F>(&self, content: &str, on_chunk: F, options: SendOptions) -> Result<(), ApiError>
    where
        F: FnMut(Fragment),
    {
        self.stream(content, on_chunk, &options).await.map_err(|e| {
            debug!("streaming request failed: {}", e);
            ApiError::from(e)
        })
    }

    /// Send `content` and wait for the complete answer.
    pub async fn send_once(&self, content: &str) -> Result<ChatResponse, ApiError> {
        let url = self.chat_url();
        let body = serde_json::to_value(ChatRequest::new(content)).map_err(SessionError::from)?;

        let result = async {
            let response = self.transport.post_json(&url, &body).await?;
            let response = ensure_success(response).await?;
            let text = response.text().await?;
            Ok::<_, SessionError>(serde_json::from_str::<ChatResponse>(&text)?)
        }
        .await;

        result.map_err(|e| {
            debug!("chat request failed: {}", e);
            ApiError::from(e)
        })
    }

    async fn stream<F>(&self, content: &str, mut on_chunk: F, options: &SendOptions) -> Result<(), SessionError>
    where
        F: FnMut(Fragment),
    {
        let url = self.stream_url();
        let body: Value = serde_json::to_value(ChatRequest::new(content))?;

        let response = tokio::select! {
            biased;
            _ = options.aborted() => return Err(SessionError::Aborted),
            response = self.transport.post_json(&url, &body) => response?,
        };
        let response = tokio::select! {
            biased;
            _ = options.aborted() => return Err(SessionError::Aborted),
            response = ensure_success(response) => response?,
        };

        let reader = response.body.ok_or(SessionError::MissingBody)?;
        let mut session = RequestSession::new(reader);
        let session_id = session.id();
        let (tx, rx) = mpsc::unbounded_channel();

        let outcome = tokio::select! {
            biased;
            _ = options.aborted() => Err(SessionError::Aborted),
            (pumped, delivered) = async {
                tokio::join!(session.pump(tx), deliver(rx, options, &mut on_chunk))
            } => pumped.map(|stats| {
                debug!(
                    session = session_id,
                    delivered,
                    malformed = stats.malformed,
                    "stream completed"
                );
            }),
        };

        session.close();
        match outcome {
            // Abort seen by the deliverer after the last poll of the abort arm
            Ok(()) if options.is_aborted() => Err(SessionError::Aborted),
            other => other,
        }
    }
}

/// Turn a non-2xx response into an error carrying its body.
async fn ensure_success(response: TransportResponse) -> Result<TransportResponse, SessionError> {
    if response.is_success() {
        return Ok(response);
    }

    let status = response.status;
    let body = response.text().await.unwrap_or_default();
    Err(SessionError::Status { status, body })
}

/// Hand fragments to `on_chunk` one at a time, pausing `options.delay` before
/// each. Stops handing out fragments once the request is aborted.
async fn deliver<F>(mut rx: mpsc::UnboundedReceiver<Fragment>, options: &SendOptions, on_chunk: &mut F) -> usize
where
    F: FnMut(Fragment),
{
    let mut delivered = 0;
    while let Some(fragment) = rx.recv().await {
        if !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
        if options.is_aborted() {
            break;
        }
        on_chunk(fragment);
        delivered += 1;
    }
    delivered
}
