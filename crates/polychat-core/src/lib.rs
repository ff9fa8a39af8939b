//! Core layer for Polychat — typed messages, generation parameters, errors,
//! configuration, and the flat-file stores for chats and system prompts.
//!
//! The provider-facing request/response logic lives in `polychat-providers`;
//! this crate holds everything that layer (and the CLI shell) builds on.

pub mod config;
pub mod error;
pub mod store;
pub mod types;
pub mod utils;

// Re-export the types nearly every consumer needs
pub use error::{ChatError, Result};
pub use types::{Conversation, GenerationConfig, Message, Role};
