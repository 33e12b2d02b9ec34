//! Conversation engine for Parley.
//!
//! Provides an OpenAI-compatible chat client with:
//! - Streaming (SSE) support
//! - Session management with serialized sends and cancellation
//! - Cumulative token usage tracking

pub mod openai;
pub mod session;
pub mod streaming;
pub mod token_tracker;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

pub use openai::{OpenAiClient, OpenAiConfig};
pub use session::{ErrorKind, Reply, SendError, Session, SessionConfig};
pub use token_tracker::TokenTracker;

/// Lazy, finite sequence of events for one streamed completion.
pub type ChatStream = BoxStream<'static, Result<StreamEvent, AiError>>;

/// A provider that turns a message list into a token stream.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Open a streaming completion. Fragments arrive as [`StreamEvent::Delta`];
    /// usage, when the provider reports it, arrives as [`StreamEvent::Usage`].
    async fn stream_chat(&self, api_key: &str, request: &ChatRequest)
        -> Result<ChatStream, AiError>;

    /// Drain a streaming completion into its full text and summed usage.
    async fn complete(&self, api_key: &str, request: &ChatRequest) -> Result<Completion, AiError> {
        let mut stream = self.stream_chat(api_key, request).await?;
        let mut completion = Completion::default();
        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Delta(text) => completion.text.push_str(&text),
                StreamEvent::Usage(usage) => completion.usage.add(&usage),
            }
        }
        Ok(completion)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One completion request: the full ordered history plus sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// One incremental text fragment, never the accumulated whole.
    Delta(String),
    Usage(TokenUsage),
}

/// Result of a fully drained completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cached_input_tokens: u64,
    pub reasoning_tokens: u64,
}

impl TokenUsage {
    /// Fold `other` in pointwise.
    pub fn add(&mut self, other: &TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
        self.cached_input_tokens = self
            .cached_input_tokens
            .saturating_add(other.cached_input_tokens);
        self.reasoning_tokens = self.reasoning_tokens.saturating_add(other.reasoning_tokens);
    }

    pub fn is_empty(&self) -> bool {
        *self == TokenUsage::default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn usage_add_is_pointwise() {
        let mut total = TokenUsage {
            input_tokens: 5,
            output_tokens: 3,
            total_tokens: 8,
            cached_input_tokens: 1,
            reasoning_tokens: 0,
        };
        total.add(&TokenUsage {
            input_tokens: 10,
            output_tokens: 4,
            total_tokens: 14,
            cached_input_tokens: 2,
            reasoning_tokens: 7,
        });
        assert_eq!(
            total,
            TokenUsage {
                input_tokens: 15,
                output_tokens: 7,
                total_tokens: 22,
                cached_input_tokens: 3,
                reasoning_tokens: 7,
            }
        );
    }

    #[test]
    fn usage_add_saturates() {
        let mut total = TokenUsage {
            input_tokens: u64::MAX,
            ..Default::default()
        };
        total.add(&TokenUsage {
            input_tokens: 1,
            ..Default::default()
        });
        assert_eq!(total.input_tokens, u64::MAX);
    }

    #[test]
    fn default_usage_is_empty() {
        assert!(TokenUsage::default().is_empty());
        let usage = TokenUsage {
            reasoning_tokens: 1,
            ..Default::default()
        };
        assert!(!usage.is_empty());
    }
}
