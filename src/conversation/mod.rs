//! Conversation transcript kept by a chat front end
//!
//! The transcript must stay consistent whatever happens to a request: every
//! submitted user turn is followed by exactly one bot turn, either the
//! streamed answer or a fixed apology when the request failed.

use crate::api::{ApiError, ChatClient, ChatTransport, SendOptions};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::warn;

/// Bot reply shown when a request fails
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One message in the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub sender: Sender,
    pub text: String,
    #[serde(skip)]
    pub timestamp: Option<Instant>,
}

impl Turn {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Some(Instant::now()),
        }
    }
}

/// What happened to a submitted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing was sent
    Ignored,
    /// The answer was streamed and recorded
    Answered,
    /// The request failed; the apology was recorded instead
    Failed(ApiError),
}

/// Transcript plus the answer currently being streamed
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
    partial: String,
    loading: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Text streamed so far for the in-flight answer
    pub fn partial(&self) -> &str {
        &self.partial
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Send `input` and record the exchange.
    ///
    /// `on_update` sees the accumulated answer after every fragment.
    pub async fn submit<T, F>(
        &mut self,
        client: &ChatClient<T>,
        input: &str,
        options: SendOptions,
        mut on_update: F,
    ) -> SubmitOutcome
    where
        T: ChatTransport,
        F: FnMut(&str),
    {
        let content = input.trim();
        if content.is_empty() {
            return SubmitOutcome::Ignored;
        }

        self.turns.push(Turn::new(Sender::User, input));
        self.partial.clear();
        self.loading = true;

        let partial = &mut self.partial;
        let result = client
            .send(
                content,
                |fragment| {
                    partial.push_str(&fragment);
                    on_update(partial.as_str());
                },
                options,
            )
            .await;

        let answer = std::mem::take(&mut self.partial);
        self.loading = false;

        match result {
            Ok(()) => {
                self.turns.push(Turn::new(Sender::Bot, answer));
                SubmitOutcome::Answered
            }
            Err(err) => {
                warn!("Failed to send message: {}", err);
                self.turns.push(Turn::new(Sender::Bot, ERROR_REPLY));
                SubmitOutcome::Failed(err)
            }
        }
    }
}
