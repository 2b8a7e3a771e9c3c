//! Tutor engine.
//!
//! Sends the tutor prompt and conversation history to a chat provider,
//! retrying transient failures with exponential backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::conversation::{
    build_system_prompt, extract_review, strip_review_block, Conversation, ConversationReview,
    FALLBACK_REPLY,
};
use crate::error::ProviderError;
use crate::traits::{ChatProvider, ChatRequest, TokenUsage};

/// Upper bound for the delay between retries.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Configuration for the tutor engine.
#[derive(Debug, Clone)]
pub struct TutorEngineConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Retries on transient provider errors.
    pub max_retries: u32,
    /// Delay before the first retry; doubled after each attempt.
    pub retry_delay: Duration,
}

impl Default for TutorEngineConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// A tutor message.
#[derive(Debug, Clone)]
pub struct TutorReply {
    /// Raw reply, including any review block.
    pub content: String,
    /// Reply with the review block removed.
    pub display_text: String,
    /// End-of-conversation review, if the reply carried one.
    pub review: Option<ConversationReview>,
    pub token_usage: TokenUsage,
    /// Wall-clock time including retries.
    pub latency_ms: u64,
}

/// Outcome of one conversation turn.
#[derive(Debug, Clone)]
pub struct TutorTurn {
    /// Text to show the learner.
    pub display_text: String,
    /// Set when the tutor wrapped up the conversation.
    pub review: Option<ConversationReview>,
    /// Whether the provider failed and the fallback reply was used.
    pub failed: bool,
}

/// Drives a conversation against a chat provider.
pub struct TutorEngine {
    provider: Arc<dyn ChatProvider>,
    config: TutorEngineConfig,
}

impl TutorEngine {
    pub fn new(provider: Arc<dyn ChatProvider>, config: TutorEngineConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn config(&self) -> &TutorEngineConfig {
        &self.config
    }

    /// Ask the tutor for the next message in `conversation`.
    ///
    /// With an empty history this produces the tutor's opening question.
    pub async fn reply(&self, conversation: &Conversation) -> Result<TutorReply> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            system_prompt: Some(build_system_prompt(&conversation.topic)),
            messages: conversation.messages.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let start = Instant::now();
        let mut last_error = None;
        let mut retry_delay = self.config.retry_delay;

        for retry in 0..=self.config.max_retries {
            if retry > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
            }

            match self.provider.chat(&request).await {
                Ok(response) => {
                    return Ok(TutorReply {
                        display_text: strip_review_block(&response.content),
                        review: extract_review(&response.content).filter(|r| r.done),
                        content: response.content,
                        token_usage: response.token_usage,
                        latency_ms: start.elapsed().as_millis() as u64,
                    });
                }
                Err(e) => {
                    if let Some(provider_err) = e.downcast_ref::<ProviderError>() {
                        if provider_err.is_permanent() {
                            return Err(e);
                        }
                        if let Some(ms) = provider_err.retry_after_ms() {
                            retry_delay = Duration::from_millis(ms).min(MAX_RETRY_DELAY);
                        }
                    }
                    tracing::warn!(
                        provider = self.provider.name(),
                        attempt = retry + 1,
                        "chat request failed: {e:#}"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("chat request failed")))
    }

    /// Run one tutor turn and record it in the conversation.
    ///
    /// A failed request records the fallback apology instead of an error.
    pub async fn respond(&self, conversation: &mut Conversation) -> TutorTurn {
        match self.reply(conversation).await {
            Ok(reply) => {
                let review = conversation.push_assistant(reply.content).cloned();
                TutorTurn {
                    display_text: reply.display_text,
                    review,
                    failed: false,
                }
            }
            Err(e) => {
                tracing::error!("tutor unavailable: {e:#}");
                conversation.push_assistant(FALLBACK_REPLY);
                TutorTurn {
                    display_text: FALLBACK_REPLY.to_string(),
                    review: None,
                    failed: true,
                }
            }
        }
    }
}
