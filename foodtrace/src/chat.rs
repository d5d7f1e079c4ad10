//! Chat request and response payloads

use foodtrace_clients::ChatMessage;
use serde::{Deserialize, Serialize};

/// A question plus the conversation so far
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<Vec<ChatMessage>>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_history: None,
        }
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.conversation_history = Some(history);
        self
    }

    /// History in its original order; absent reads as empty
    pub fn history(&self) -> &[ChatMessage] {
        self.conversation_history.as_deref().unwrap_or_default()
    }
}

/// Generated (or cached) answer and the model it is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_without_history() {
        let request: ChatRequest = serde_json::from_value(json!({"message": "hi"})).unwrap();
        assert!(request.conversation_history.is_none());
        assert!(request.history().is_empty());

        let request: ChatRequest =
            serde_json::from_value(json!({"message": "hi", "conversation_history": null})).unwrap();
        assert!(request.history().is_empty());
    }

    #[test]
    fn test_request_history_order_kept() {
        let request: ChatRequest = serde_json::from_value(json!({
            "message": "and B2?",
            "conversation_history": [
                {"role": "user", "content": "Did B1 pass?"},
                {"role": "assistant", "content": "Yes."}
            ]
        }))
        .unwrap();

        assert_eq!(
            request.history(),
            &[ChatMessage::user("Did B1 pass?"), ChatMessage::assistant("Yes.")]
        );
    }
}
