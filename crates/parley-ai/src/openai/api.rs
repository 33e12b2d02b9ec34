//! AiClient trait implementation for OpenAiClient.

use async_trait::async_trait;
use futures_util::future;
use futures_util::stream::{self, StreamExt};
use tracing::debug;

use crate::streaming::sse_events;
use crate::{AiClient, AiError, ChatRequest, ChatStream};

use super::client::{parse_chunk, OpenAiClient};

const DONE_MARKER: &str = "[DONE]";

#[async_trait]
impl AiClient for OpenAiClient {
    async fn stream_chat(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<ChatStream, AiError> {
        let body = self.build_request_body(request);

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "OpenAI streaming request"
        );

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AiError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
        }

        let events = sse_events(response)
            .take_while(|event| {
                let done = matches!(event, Ok(e) if e.data.trim() == DONE_MARKER);
                future::ready(!done)
            })
            .flat_map(|event| match event.and_then(|e| parse_chunk(&e.data)) {
                Ok(parsed) => stream::iter(parsed.into_iter().map(Ok)).left_stream(),
                Err(e) => stream::once(future::ready(Err(e))).right_stream(),
            });

        Ok(events.boxed())
    }
}

fn transport_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Timeout
    } else {
        AiError::NetworkError(e.to_string())
    }
}
