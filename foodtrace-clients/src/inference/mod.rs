//! LLM inference engine client
//!
//! Generation failures are returned to the caller: there is no sensible
//! stand-in for a missing answer. Availability checks, on the other hand,
//! only ever report `false`.

pub mod message;
pub mod ollama;

pub use message::{ChatMessage, Role};
pub use ollama::{OllamaClient, DEFAULT_INFERENCE_TIMEOUT, DEFAULT_PROBE_TIMEOUT};

use crate::error::Result;
use async_trait::async_trait;
use tracing::warn;

/// Chat-completion engine
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Model identifier requests are served with
    fn model_id(&self) -> &str;

    /// Cheap reachability check
    async fn ping(&self) -> Result<()>;

    /// Reachability as a plain flag, for start-up and health reporting
    async fn check_availability(&self) -> bool {
        match self.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Inference engine connection failed: {}", e);
                false
            }
        }
    }

    /// Make sure the configured model is resident, fetching it if needed.
    /// Returns whether the model is usable afterwards.
    async fn ensure_model_available(&self) -> bool;

    /// Generate a reply to `user_message`.
    ///
    /// The engine receives the system prompt (when given), then `history`
    /// verbatim, then the user message.
    async fn generate_response(
        &self,
        user_message: &str,
        system_prompt: Option<&str>,
        history: &[ChatMessage],
        temperature: f32,
    ) -> Result<String>;
}

/// Assemble the message sequence sent to the engine.
pub fn build_messages(
    user_message: &str,
    system_prompt: Option<&str>,
    history: &[ChatMessage],
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);

    if let Some(prompt) = system_prompt.filter(|p| !p.is_empty()) {
        messages.push(ChatMessage::system(prompt));
    }
    messages.extend_from_slice(history);
    messages.push(ChatMessage::user(user_message));

    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_order() {
        let history = vec![
            ChatMessage::user("Which batches are mangoes?"),
            ChatMessage::assistant("B1."),
            ChatMessage::system("Answer briefly."),
        ];

        let messages = build_messages(
            "Did B1 pass?",
            Some("You are a traceability assistant."),
            &history,
        );

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0], ChatMessage::system("You are a traceability assistant."));
        assert_eq!(&messages[1..4], history.as_slice());
        assert_eq!(messages[4], ChatMessage::user("Did B1 pass?"));
    }

    #[test]
    fn test_build_messages_without_system_prompt() {
        let messages = build_messages("hello", None, &[]);
        assert_eq!(messages, vec![ChatMessage::user("hello")]);

        let messages = build_messages("hello", Some(""), &[]);
        assert_eq!(messages, vec![ChatMessage::user("hello")]);
    }
}
