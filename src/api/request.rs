//! API request structures

use serde::{Deserialize, Serialize};

/// Body of a widget chat request, streamed or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Message text, already validated by the caller
    pub content: String,
}

impl ChatRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Body of an API-key authenticated `/chat` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl AskRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_request_body() {
        let body = serde_json::to_value(ChatRequest::new("hi")).unwrap();
        assert_eq!(body, json!({ "content": "hi" }));
    }

    #[test]
    fn test_ask_request_omits_missing_context() {
        let body = serde_json::to_value(AskRequest::new("hi")).unwrap();
        assert_eq!(body, json!({ "message": "hi" }));

        let body = serde_json::to_value(AskRequest::new("hi").with_context("faq")).unwrap();
        assert_eq!(body, json!({ "message": "hi", "context": "faq" }));
    }
}
