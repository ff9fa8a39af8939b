//! Flat-file persistence — saved chats (JSON) and system prompts (Markdown).
//!
//! Both stores assume a single-user interactive session: operations are
//! independent, non-overlapping filesystem calls with no locking, and
//! concurrent writers to the same name are last-write-wins.

pub mod chats;
pub mod prompts;

pub use chats::{ChatRecord, ChatStore, ChatSummary};
pub use prompts::{PromptStore, SystemPromptRecord};
