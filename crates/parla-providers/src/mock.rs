//! Mock provider for tests and offline demos.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use parla_core::traits::{ChatProvider, ChatRequest, ChatResponse, ModelInfo, TokenUsage};

const DEFAULT_REPLY: &str = "Ciao! Sono Marco. Di cosa vuoi parlare oggi?";

/// A chat provider that plays back scripted replies.
///
/// Replies are returned in order; once the script is exhausted every call
/// gets the default reply.
pub struct MockProvider {
    script: Mutex<VecDeque<String>>,
    default_reply: String,
    call_count: AtomicU32,
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(Into::into).collect()),
            default_reply: DEFAULT_REPLY.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A mock that always returns the same reply.
    pub fn with_fixed_response(reply: &str) -> Self {
        Self {
            default_reply: reply.to_string(),
            ..Self::new(Vec::<String>::new())
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        let content = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        let prompt_chars: usize = request.messages.iter().map(|m| m.content.len()).sum::<usize>()
            + request.system_prompt.as_ref().map_or(0, String::len);
        let prompt_tokens = (prompt_chars / 4) as u32; // Rough estimate
        let completion_tokens = (content.len() / 4) as u32;

        Ok(ChatResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
                estimated_cost_usd: 0.0,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
            cost_per_1k_input: 0.0,
            cost_per_1k_output: 0.0,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parla_core::traits::ChatMessage;

    fn request(text: &str) -> ChatRequest {
        ChatRequest {
            model: "mock-model".into(),
            system_prompt: None,
            messages: vec![ChatMessage::user(text)],
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("Bravo!");
        let response = provider.chat(&request("ciao")).await.unwrap();
        assert_eq!(response.content, "Bravo!");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn scripted_replies_then_default() {
        let provider = MockProvider::new(["Prima", "Seconda"]);

        assert_eq!(provider.chat(&request("a")).await.unwrap().content, "Prima");
        assert_eq!(provider.chat(&request("b")).await.unwrap().content, "Seconda");
        assert_eq!(provider.chat(&request("c")).await.unwrap().content, DEFAULT_REPLY);

        assert_eq!(provider.call_count(), 3);
        let last = provider.last_request().unwrap();
        assert_eq!(last.messages[0].content, "c");
    }
}
