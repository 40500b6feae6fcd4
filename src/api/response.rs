//! API response structures

use serde::{Deserialize, Serialize};

/// Complete answer from a non-streaming chat call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated answer
    pub response: String,

    /// Documents the answer was grounded on
    #[serde(default)]
    pub sources: Vec<String>,

    /// Retrieval confidence reported by the backend
    #[serde(default)]
    pub confidence: f64,

    /// Bot that produced the answer, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
}

impl ChatResponse {
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let json = r#"{"response":"Hi","sources":["faq.pdf"],"confidence":0.82,"bot_id":"b1"}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.response, "Hi");
        assert!(response.has_sources());
        assert_eq!(response.bot_id.as_deref(), Some("b1"));
    }

    #[test]
    fn test_parse_minimal_response() {
        let response: ChatResponse = serde_json::from_str(r#"{"response":"Hi"}"#).unwrap();
        assert!(!response.has_sources());
        assert_eq!(response.confidence, 0.0);
        assert!(response.bot_id.is_none());
    }
}
