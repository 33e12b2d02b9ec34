pub mod credentials;
pub mod errors;
pub mod id;

pub use credentials::{CredentialStore, MemoryCredentialStore, API_KEY_ENTRY};
pub use errors::{ConfigError, CredentialError};
pub use id::{new_id, SessionId};

/// Seed system message for new conversations.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Provide clear, concise, and helpful responses to user questions.";
