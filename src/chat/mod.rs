//! Client side of the chat proxy: wire types for an OpenAI-compatible
//! completions API, the HTTP client, and the KitchenPal prompt/reply handling.

pub mod assistant;
pub mod connection;
pub mod endpoints;

pub use assistant::{ask_assistant, AssistantReply};
pub use connection::{ApiConnectionError, CompletionClient};
pub use endpoints::{ChatMessage, Role};
