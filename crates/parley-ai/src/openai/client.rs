//! OpenAI client struct, request building, and chunk parsing.

use crate::{AiError, ChatRequest, StreamEvent, TokenUsage};

use super::config::OpenAiConfig;

/// OpenAI-compatible chat-completions client.
pub struct OpenAiClient {
    pub(crate) config: OpenAiConfig,
    pub(crate) http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AiError::NetworkError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Build the JSON request body for a streaming completion.
    pub(crate) fn build_request_body(&self, request: &ChatRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "stream": true,
            "stream_options": { "include_usage": true },
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }
}

/// Parse one `data:` payload into zero or more stream events.
pub(crate) fn parse_chunk(data: &str) -> Result<Vec<StreamEvent>, AiError> {
    let json: serde_json::Value =
        serde_json::from_str(data).map_err(|e| AiError::ParseError(e.to_string()))?;

    if let Some(error) = json.get("error") {
        let message = error["message"]
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| error.to_string());
        return Err(AiError::ApiError(message));
    }

    let mut events = Vec::new();

    if let Some(text) = json["choices"][0]["delta"]["content"].as_str() {
        if !text.is_empty() {
            events.push(StreamEvent::Delta(text.to_string()));
        }
    }

    if let Some(usage) = json.get("usage").filter(|u| u.is_object()) {
        events.push(StreamEvent::Usage(parse_usage(usage)));
    }

    Ok(events)
}

pub(crate) fn parse_usage(usage: &serde_json::Value) -> TokenUsage {
    let input_tokens = usage["prompt_tokens"].as_u64().unwrap_or(0);
    let output_tokens = usage["completion_tokens"].as_u64().unwrap_or(0);
    let total_tokens = usage["total_tokens"]
        .as_u64()
        .unwrap_or_else(|| input_tokens.saturating_add(output_tokens));

    TokenUsage {
        input_tokens,
        output_tokens,
        total_tokens,
        cached_input_tokens: usage["prompt_tokens_details"]["cached_tokens"]
            .as_u64()
            .unwrap_or(0),
        reasoning_tokens: usage["completion_tokens_details"]["reasoning_tokens"]
            .as_u64()
            .unwrap_or(0),
    }
}
