//! Session configuration, reply, and internal state types.

use parley_common::DEFAULT_SYSTEM_PROMPT;

use crate::token_tracker::TokenTracker;
use crate::{Message, TokenUsage};

/// Sampling and prompt settings for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub system_prompt: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: Some(1000),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

/// A successful reply. `usage` is the session's cumulative total, not
/// this call's delta.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub usage: TokenUsage,
}

pub(super) struct SessionState {
    pub(super) messages: Vec<Message>,
    pub(super) tracker: TokenTracker,
    /// Bumped by `clear()`. A reply that started in an older epoch is not appended.
    pub(super) epoch: u64,
}
