//! Conversation session management.
//!
//! A `Session` owns the message history (seeded with one system
//! prompt), streams replies from an `AiClient`, and accumulates token
//! usage. Sends on one session are serialized.

mod chat;
mod error;
mod manager;
mod types;


pub use chat::ChunkSink;
pub use error::{classify_description, ErrorKind, SendError};
pub use manager::Session;
pub use types::{Reply, SessionConfig};
