//! OpenAI chat-completions client.
//!
//! Implements the `AiClient` trait against any OpenAI-compatible
//! `/chat/completions` endpoint with `stream: true`. The API key is
//! supplied per request, so a key change takes effect on the next call.

mod api;
mod client;
mod config;


pub use client::OpenAiClient;
pub use config::OpenAiConfig;
