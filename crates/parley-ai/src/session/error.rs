//! Typed failures at the session boundary.

use parley_common::CredentialError;

use crate::AiError;

/// Coarse failure category, used by the presentation layer to pick a
/// user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingCredential,
    Unauthorized,
    RateLimited,
    NetworkFailure,
    EmptyResponse,
    Cancelled,
    Busy,
    Unknown,
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("no API key configured")]
    MissingCredential,
    #[error("credential lookup failed: {0}")]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Provider(#[from] AiError),
    #[error("provider returned an empty response")]
    EmptyResponse,
    #[error("request cancelled")]
    Cancelled,
    #[error("session is busy with another request")]
    Busy,
}

impl SendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SendError::MissingCredential => ErrorKind::MissingCredential,
            SendError::EmptyResponse => ErrorKind::EmptyResponse,
            SendError::Cancelled => ErrorKind::Cancelled,
            SendError::Busy => ErrorKind::Busy,
            SendError::Credential(e) => classify_description(&e.to_string()),
            SendError::Provider(e) => match e {
                AiError::Unauthorized => ErrorKind::Unauthorized,
                AiError::RateLimited => ErrorKind::RateLimited,
                AiError::NetworkError(_) | AiError::Timeout => ErrorKind::NetworkFailure,
                AiError::ApiError(detail) | AiError::ParseError(detail) => {
                    classify_description(detail)
                }
            },
        }
    }
}

/// Categorize an untyped failure description by the status codes and
/// keywords upstream error text is known to carry.
pub fn classify_description(description: &str) -> ErrorKind {
    let lower = description.to_lowercase();
    if lower.contains("401") || lower.contains("unauthorized") {
        ErrorKind::Unauthorized
    } else if lower.contains("429") {
        ErrorKind::RateLimited
    } else if lower.contains("network") || lower.contains("fetch") {
        ErrorKind::NetworkFailure
    } else {
        ErrorKind::Unknown
    }
}
