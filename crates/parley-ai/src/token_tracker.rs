//! Token usage tracking across a session's lifetime.

use crate::TokenUsage;

/// Tracks cumulative token usage. Totals only ever grow.
#[derive(Debug, Clone, Default)]
pub struct TokenTracker {
    /// Total usage across all calls.
    total: TokenUsage,
    /// Usage reported by the most recent call.
    last: Option<TokenUsage>,
    /// Number of API calls recorded.
    call_count: u64,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record token usage from an API call.
    pub fn record(&mut self, usage: &TokenUsage) {
        self.total.add(usage);
        self.last = Some(*usage);
        self.call_count += 1;
    }

    /// Get total token usage.
    pub fn total(&self) -> &TokenUsage {
        &self.total
    }

    /// Usage of the most recent call, if any.
    pub fn last(&self) -> Option<&TokenUsage> {
        self.last.as_ref()
    }

    /// Get number of API calls.
    pub fn call_count(&self) -> u64 {
        self.call_count
    }
}
