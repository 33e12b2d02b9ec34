//! Chat provider and conversation settings.

use serde::{Deserialize, Serialize};

pub use parley_common::DEFAULT_SYSTEM_PROMPT;

/// Chat-completion provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    /// Base URL of an OpenAI-compatible API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Sampling temperature (valid range: 0.0-2.0).
    pub temperature: f64,
    /// Upper bound on generated tokens per reply (valid range: 1-128000).
    pub max_tokens: u32,
    /// Seed message placed at the head of every conversation.
    pub system_prompt: String,
    /// Valid range: 1-120.
    pub connect_timeout_secs: u32,
    /// Valid range: 1-600.
    pub request_timeout_secs: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}
