pub mod extract;
pub mod groq;
pub mod json;
pub mod ollama;
pub mod router;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Wire-format message list for chat-style APIs: the system prompt first,
/// then the conversation as given.
pub(crate) fn chat_messages(system_prompt: &str, messages: &[Message]) -> Vec<Message> {
    let mut out = Vec::with_capacity(messages.len() + 1);
    out.push(Message {
        role: "system".to_string(),
        content: system_prompt.to_string(),
    });
    out.extend_from_slice(messages);
    out
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String>;
}

/// One stateless, single-turn call bounded by `timeout`. An elapsed timer is
/// reported as an error like any other provider failure.
pub async fn complete(
    llm: &dyn LlmProvider,
    system_prompt: &str,
    user_message: &str,
    timeout: Duration,
) -> anyhow::Result<String> {
    let messages = [Message::user(user_message)];
    match tokio::time::timeout(timeout, llm.chat(system_prompt, &messages)).await {
        Ok(result) => result,
        Err(_) => anyhow::bail!("language model call timed out after {}s", timeout.as_secs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_messages_put_system_prompt_first() {
        let out = chat_messages("route this", &[Message::user("hello")]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].role, "system");
        assert_eq!(out[0].content, "route this");
        assert_eq!(out[1].role, "user");
        assert_eq!(out[1].content, "hello");
    }
}
