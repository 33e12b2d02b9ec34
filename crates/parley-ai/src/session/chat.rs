//! Async send methods for Session (plain, streaming, cancellable).

use futures_util::StreamExt;
use parley_common::API_KEY_ENTRY;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{AiError, ChatRequest, Completion, Message, StreamEvent};

use super::error::SendError;
use super::manager::Session;
use super::types::Reply;

/// Receiver for reply fragments. Each call gets exactly one fragment.
pub type ChunkSink<'a> = &'a mut (dyn FnMut(&str) + Send);

const PROBE_PROMPT: &str = "Hello";
const PROBE_MAX_TOKENS: u32 = 10;

impl Session {
    /// Send a user message and wait for the full reply.
    ///
    /// Waits for any in-flight send on this session to finish first.
    pub async fn send(&self, user_text: impl Into<String>) -> Result<Reply, SendError> {
        let _gate = self.in_flight.lock().await;
        self.run_send(user_text.into(), None, None).await
    }

    /// Send a user message, passing each reply fragment to `on_chunk` as
    /// it arrives.
    pub async fn send_streaming<F>(
        &self,
        user_text: impl Into<String>,
        mut on_chunk: F,
    ) -> Result<Reply, SendError>
    where
        F: FnMut(&str) + Send,
    {
        let _gate = self.in_flight.lock().await;
        let sink: ChunkSink<'_> = &mut on_chunk;
        self.run_send(user_text.into(), Some(sink), None).await
    }

    /// Like [`send_streaming`](Self::send_streaming), but gives up with
    /// `SendError::Cancelled` once `cancel` fires. A cancelled send keeps
    /// its user entry and records neither a reply nor usage.
    pub async fn send_with_cancel<F>(
        &self,
        user_text: impl Into<String>,
        mut on_chunk: F,
        cancel: &CancellationToken,
    ) -> Result<Reply, SendError>
    where
        F: FnMut(&str) + Send,
    {
        let _gate = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SendError::Cancelled),
            gate = self.in_flight.lock() => gate,
        };
        let sink: ChunkSink<'_> = &mut on_chunk;
        self.run_send(user_text.into(), Some(sink), Some(cancel)).await
    }

    /// Like [`send_streaming`](Self::send_streaming), but fails with
    /// `SendError::Busy` instead of waiting when a send is in flight.
    pub async fn try_send<F>(
        &self,
        user_text: impl Into<String>,
        mut on_chunk: F,
    ) -> Result<Reply, SendError>
    where
        F: FnMut(&str) + Send,
    {
        let _gate = self.in_flight.try_lock().map_err(|_| SendError::Busy)?;
        let sink: ChunkSink<'_> = &mut on_chunk;
        self.run_send(user_text.into(), Some(sink), None).await
    }

    /// Probe the provider with an isolated one-message exchange.
    ///
    /// Returns false when no API key is configured or the exchange fails.
    /// Session history and usage are never touched.
    pub async fn test_connection(&self) -> bool {
        let api_key = match self.credentials.get_non_blank(API_KEY_ENTRY) {
            Ok(Some(key)) => key,
            Ok(None) => {
                debug!(session = %self.id.short(), "connection test skipped: no API key");
                return false;
            }
            Err(e) => {
                warn!(session = %self.id.short(), "connection test failed: {e}");
                return false;
            }
        };

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message::user(PROBE_PROMPT)],
            temperature: self.config.temperature,
            max_tokens: Some(PROBE_MAX_TOKENS),
        };

        match self.client.complete(&api_key, &request).await {
            Ok(completion) => {
                debug!(
                    session = %self.id.short(),
                    chars = completion.text.len(),
                    "connection test succeeded"
                );
                true
            }
            Err(e) => {
                warn!(session = %self.id.short(), "connection test failed: {e}");
                false
            }
        }
    }

    /// One full exchange. The caller must hold the in-flight gate.
    async fn run_send(
        &self,
        user_text: String,
        on_chunk: Option<ChunkSink<'_>>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Reply, SendError> {
        let api_key = match self.credentials.get_non_blank(API_KEY_ENTRY)? {
            Some(key) => key,
            None => {
                debug!(session = %self.id.short(), "send skipped: no API key");
                return Err(SendError::MissingCredential);
            }
        };

        let (request, epoch) = self.begin_exchange(user_text);
        debug!(
            session = %self.id.short(),
            messages = request.messages.len(),
            "sending message"
        );

        let exchange = self.stream_reply(&api_key, &request, on_chunk);
        let result = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(session = %self.id.short(), "send cancelled");
                    return Err(SendError::Cancelled);
                }
                result = exchange => result,
            },
            None => exchange.await,
        };

        let completion = result.inspect_err(|e| {
            warn!(session = %self.id.short(), "send failed: {e}");
        })?;
        self.finish_exchange(completion, epoch)
    }

    /// Append the user entry and snapshot the request.
    fn begin_exchange(&self, user_text: String) -> (ChatRequest, u64) {
        let mut state = self.lock_state();
        state.messages.push(Message::user(user_text));
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: state.messages.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        (request, state.epoch)
    }

    /// Consume the provider stream, forwarding fragments in arrival order.
    async fn stream_reply(
        &self,
        api_key: &str,
        request: &ChatRequest,
        mut on_chunk: Option<ChunkSink<'_>>,
    ) -> Result<Completion, AiError> {
        let mut stream = self.client.stream_chat(api_key, request).await?;
        let mut completion = Completion::default();
        let mut fragments = 0usize;
        let mut saw_usage = false;

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Delta(fragment) => {
                    if fragment.is_empty() {
                        continue;
                    }
                    completion.text.push_str(&fragment);
                    fragments += 1;
                    if let Some(sink) = on_chunk.as_deref_mut() {
                        sink(&fragment);
                    }
                }
                StreamEvent::Usage(usage) => {
                    completion.usage.add(&usage);
                    saw_usage = true;
                }
            }
        }

        if !saw_usage {
            warn!(session = %self.id.short(), "No usage data received in streaming response");
        }
        debug!(
            session = %self.id.short(),
            fragments,
            chars = completion.text.len(),
            "stream complete"
        );
        Ok(completion)
    }

    /// Fold usage and, for a non-blank reply, append the assistant entry.
    fn finish_exchange(&self, completion: Completion, epoch: u64) -> Result<Reply, SendError> {
        let mut state = self.lock_state();
        state.tracker.record(&completion.usage);

        if completion.text.trim().is_empty() {
            warn!(session = %self.id.short(), "Empty response received");
            return Err(SendError::EmptyResponse);
        }

        if state.epoch == epoch {
            state.messages.push(Message::assistant(completion.text.clone()));
        } else {
            debug!(session = %self.id.short(), "history cleared during send; reply not recorded");
        }

        Ok(Reply {
            text: completion.text,
            usage: *state.tracker.total(),
        })
    }
}
