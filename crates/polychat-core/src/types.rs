//! Core chat types — messages, conversations, and generation parameters.
//!
//! Messages use the OpenAI chat completions shape (`role` + `content`), which
//! is also the on-disk format for saved chats. A `Conversation` is an owned,
//! explicit value passed into and returned from each handling step — the core
//! never holds conversation state across calls.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Roles and messages
// ─────────────────────────────────────────────

/// Speaker role of a chat message.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single chat message.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Message {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Conversation
// ─────────────────────────────────────────────

/// An ordered sequence of messages forming one conversation.
///
/// Invariant maintained by the mutators: at most one system message, and if
/// present it is the first entry. Turn order of the remaining messages is
/// chronological and preserved as-is.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Conversation::default()
    }

    /// Create a conversation seeded with a system prompt.
    pub fn with_system(prompt: impl Into<String>) -> Self {
        Conversation {
            messages: vec![Message::system(prompt)],
        }
    }

    /// Build from an existing message list (e.g. a loaded chat record).
    /// The list is taken as-is; callers loading untrusted data should rely
    /// on the normalizer's validation.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Conversation { messages }
    }

    /// Set or replace the system prompt, keeping it as the first message.
    pub fn set_system(&mut self, prompt: impl Into<String>) {
        match self.messages.first() {
            Some(m) if m.role == Role::System => {
                self.messages[0].content = prompt.into();
            }
            _ => self.messages.insert(0, Message::system(prompt)),
        }
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append an assistant message.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Remove every message, including the system prompt.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ─────────────────────────────────────────────
// Generation parameters
// ─────────────────────────────────────────────

/// Maximum output tokens the UI ever offered; requests are capped here.
pub const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Per-request generation parameters, constructed from user input.
///
/// `temperature` and `top_p` are expected in `[0.0, 1.0]` and `max_tokens`
/// in `[1, MAX_OUTPUT_TOKENS]`; out-of-range values are clamped by
/// [`GenerationConfig::clamped`] before a request is built.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub stream: bool,
    pub json_mode: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            temperature: 0.7,
            max_tokens: 256,
            top_p: 1.0,
            stream: true,
            json_mode: false,
        }
    }
}

impl GenerationConfig {
    /// Return a copy with every parameter forced into its valid range.
    pub fn clamped(&self) -> Self {
        GenerationConfig {
            temperature: self.temperature.clamp(0.0, 1.0),
            max_tokens: self.max_tokens.clamp(1, MAX_OUTPUT_TOKENS),
            top_p: self.top_p.clamp(0.0, 1.0),
            stream: self.stream,
            json_mode: self.json_mode,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization() {
        let msg = Message::user("Hello, world!");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "Hello, world!");
    }

    #[test]
    fn test_message_round_trip() {
        let messages = vec![
            Message::system("You are helpful."),
            Message::user("hi"),
            Message::assistant("there"),
        ];
        let json = serde_json::to_string(&messages).unwrap();
        let back: Vec<Message> = serde_json::from_str(&json).unwrap();
        assert_eq!(messages, back);
    }

    #[test]
    fn test_role_deserialization() {
        let msg: Message = serde_json::from_value(serde_json::json!({
            "role": "assistant",
            "content": "42"
        }))
        .unwrap();
        assert_eq!(msg.role, Role::Assistant);
    }

    #[test]
    fn test_set_system_on_empty() {
        let mut conv = Conversation::new();
        conv.set_system("Be terse.");
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.messages()[0].role, Role::System);
    }

    #[test]
    fn test_set_system_replaces_existing() {
        let mut conv = Conversation::with_system("v1");
        conv.push_user("hi");
        conv.set_system("v2");

        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[0].content, "v2");
        assert_eq!(conv.messages()[1].role, Role::User);
    }

    #[test]
    fn test_set_system_inserts_before_turns() {
        let mut conv = Conversation::new();
        conv.push_user("hi");
        conv.set_system("late prompt");

        assert_eq!(conv.messages()[0].role, Role::System);
        assert_eq!(conv.messages()[1].content, "hi");
    }

    #[test]
    fn test_turn_order_preserved() {
        let mut conv = Conversation::new();
        for i in 0..5 {
            conv.push_user(format!("u{i}"));
            conv.push_assistant(format!("a{i}"));
        }
        let contents: Vec<&str> = conv.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents[0], "u0");
        assert_eq!(contents[9], "a4");
    }

    #[test]
    fn test_clamped_ranges() {
        let config = GenerationConfig {
            temperature: 1.8,
            max_tokens: 0,
            top_p: -0.2,
            stream: false,
            json_mode: true,
        };
        let clamped = config.clamped();
        assert_eq!(clamped.temperature, 1.0);
        assert_eq!(clamped.max_tokens, 1);
        assert_eq!(clamped.top_p, 0.0);
        assert!(clamped.json_mode);
    }

    #[test]
    fn test_clamped_in_range_unchanged() {
        let config = GenerationConfig::default();
        assert_eq!(config.clamped(), config);
    }
}
