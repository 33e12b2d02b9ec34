//! User-facing text for session outcomes.
//!
//! The session reports typed failures; this is the only place they turn
//! into chat-style replies.

use parley_ai::{ErrorKind, Message, Reply, Role, SendError, TokenUsage};

pub const MISSING_KEY_TEXT: &str =
    "Please configure your OpenAI API key in the settings to use the AI chat feature.";
pub const INVALID_KEY_TEXT: &str =
    "Invalid API key. Please check your OpenAI API key in the settings.";
pub const RATE_LIMIT_TEXT: &str = "Rate limit exceeded. Please try again in a moment.";
pub const NETWORK_TEXT: &str =
    "Network error. Please check your internet connection and try again.";
pub const EMPTY_RESPONSE_TEXT: &str =
    "I apologize, but I received an empty response. Please try again.";
pub const CANCELLED_TEXT: &str = "(reply cancelled)";
pub const BUSY_TEXT: &str = "Another reply is still in progress. Please wait for it to finish.";

/// Canned text for a failure. Unknown failures carry their description.
pub fn render_error(err: &SendError) -> String {
    match err.kind() {
        ErrorKind::MissingCredential => MISSING_KEY_TEXT.to_string(),
        ErrorKind::Unauthorized => INVALID_KEY_TEXT.to_string(),
        ErrorKind::RateLimited => RATE_LIMIT_TEXT.to_string(),
        ErrorKind::NetworkFailure => NETWORK_TEXT.to_string(),
        ErrorKind::EmptyResponse => EMPTY_RESPONSE_TEXT.to_string(),
        ErrorKind::Cancelled => CANCELLED_TEXT.to_string(),
        ErrorKind::Busy => BUSY_TEXT.to_string(),
        ErrorKind::Unknown => format!("Error: {err}"),
    }
}

/// Reply text on success, canned text on failure. Never fails.
pub fn render_outcome(outcome: &Result<Reply, SendError>) -> String {
    match outcome {
        Ok(reply) => reply.text.clone(),
        Err(err) => render_error(err),
    }
}

pub fn usage_summary(usage: &TokenUsage, calls: u64) -> String {
    format!(
        "{} calls | input {} (cached {}) | output {} (reasoning {}) | total {}",
        calls,
        usage.input_tokens,
        usage.cached_input_tokens,
        usage.output_tokens,
        usage.reasoning_tokens,
        usage.total_tokens,
    )
}

pub fn history_line(message: &Message) -> String {
    let label = match message.role {
        Role::System => "system",
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    format!("[{label}] {}", message.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_ai::AiError;

    #[test]
    fn each_kind_has_its_canned_text() {
        assert_eq!(render_error(&SendError::MissingCredential), MISSING_KEY_TEXT);
        assert_eq!(
            render_error(&SendError::from(AiError::Unauthorized)),
            INVALID_KEY_TEXT
        );
        assert_eq!(
            render_error(&SendError::from(AiError::RateLimited)),
            RATE_LIMIT_TEXT
        );
        assert_eq!(
            render_error(&SendError::from(AiError::NetworkError("reset".into()))),
            NETWORK_TEXT
        );
        assert_eq!(render_error(&SendError::EmptyResponse), EMPTY_RESPONSE_TEXT);
        assert_eq!(render_error(&SendError::Cancelled), CANCELLED_TEXT);
        assert_eq!(render_error(&SendError::Busy), BUSY_TEXT);
    }

    #[test]
    fn textual_429_renders_rate_limit() {
        let err = SendError::from(AiError::ApiError("HTTP 502: got 429 upstream".into()));
        assert_eq!(render_error(&err), RATE_LIMIT_TEXT);
    }

    #[test]
    fn unknown_failure_includes_description() {
        let err = SendError::from(AiError::ApiError("HTTP 500: model exploded".into()));
        let text = render_error(&err);
        assert!(text.starts_with("Error: "));
        assert!(text.contains("model exploded"));
    }

    #[test]
    fn outcome_success_is_reply_text() {
        let outcome = Ok(Reply {
            text: "Hi there!".into(),
            usage: TokenUsage::default(),
        });
        assert_eq!(render_outcome(&outcome), "Hi there!");
    }

    #[test]
    fn usage_summary_lists_all_counters() {
        let usage = TokenUsage {
            input_tokens: 5,
            output_tokens: 3,
            total_tokens: 8,
            cached_input_tokens: 1,
            reasoning_tokens: 2,
        };
        assert_eq!(
            usage_summary(&usage, 1),
            "1 calls | input 5 (cached 1) | output 3 (reasoning 2) | total 8"
        );
    }

    #[test]
    fn history_lines_are_labelled() {
        assert_eq!(history_line(&Message::user("hi")), "[you] hi");
        assert_eq!(history_line(&Message::assistant("yo")), "[assistant] yo");
        assert_eq!(history_line(&Message::system("rules")), "[system] rules");
    }
}
