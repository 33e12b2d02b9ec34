//! Session struct and conversation management.

use std::sync::{Arc, Mutex, MutexGuard};

use parley_common::{CredentialStore, SessionId};
use tracing::debug;

use crate::token_tracker::TokenTracker;
use crate::{AiClient, Message, TokenUsage};

use super::types::{SessionConfig, SessionState};

/// A conversation session with message history and usage accounting.
///
/// Construct one per conversation and share it by reference or `Arc`.
/// `history`, `token_usage` and `clear` never wait on an in-flight send.
pub struct Session {
    pub(super) id: SessionId,
    pub(super) config: SessionConfig,
    pub(super) client: Arc<dyn AiClient>,
    pub(super) credentials: Arc<dyn CredentialStore>,
    /// History and usage. Never held across an `.await`.
    pub(super) state: Mutex<SessionState>,
    /// Held for the whole of a send, so sends run one at a time.
    pub(super) in_flight: tokio::sync::Mutex<()>,
}

impl Session {
    pub fn new(
        client: Arc<dyn AiClient>,
        credentials: Arc<dyn CredentialStore>,
        config: SessionConfig,
    ) -> Self {
        let state = SessionState {
            messages: vec![Message::system(config.system_prompt.clone())],
            tracker: TokenTracker::new(),
            epoch: 0,
        };
        Self {
            id: SessionId::new(),
            config,
            client,
            credentials,
            state: Mutex::new(state),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Copy of the full conversation history, system prompt first.
    pub fn history(&self) -> Vec<Message> {
        self.lock_state().messages.clone()
    }

    /// Number of messages in history.
    pub fn message_count(&self) -> usize {
        self.lock_state().messages.len()
    }

    /// Cumulative usage over the session's lifetime.
    pub fn token_usage(&self) -> TokenUsage {
        *self.lock_state().tracker.total()
    }

    /// Usage reported by the most recent completed call.
    pub fn last_usage(&self) -> Option<TokenUsage> {
        self.lock_state().tracker.last().copied()
    }

    /// Number of provider calls whose usage has been recorded.
    pub fn call_count(&self) -> u64 {
        self.lock_state().tracker.call_count()
    }

    /// Whether a send is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Reset history to the seed system message. Usage is kept.
    pub fn clear(&self) {
        let mut state = self.lock_state();
        state.messages.truncate(1);
        state.epoch += 1;
        debug!(session = %self.id.short(), "history cleared");
    }

    pub(super) fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
