//! Two-agent dialogue simulator.
//!
//! Two agents with independent system prompts (and potentially different
//! providers/models) take turns: the current speaker generates a reply from
//! its own conversation memory, the listener hears that reply as a user
//! message, and the roles swap. The exchange is seeded by one initial user
//! message addressed to the first agent and runs for a fixed number of
//! turns — there is no other stop condition.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use polychat_core::error::Result;
use polychat_core::types::{Conversation, GenerationConfig};
use polychat_providers::CompletionClient;

// ─────────────────────────────────────────────
// DialogueAgent
// ─────────────────────────────────────────────

/// One participant: a name, a private conversation memory seeded with a
/// system prompt, and the completion client that speaks for it.
pub struct DialogueAgent {
    name: String,
    memory: Conversation,
    client: Arc<dyn CompletionClient>,
}

impl DialogueAgent {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        DialogueAgent {
            name: name.into(),
            memory: Conversation::with_system(system_prompt),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The agent's private view of the exchange so far.
    pub fn memory(&self) -> &Conversation {
        &self.memory
    }

    /// Record a message spoken *to* this agent.
    pub fn hear(&mut self, text: impl Into<String>) {
        self.memory.push_user(text);
    }

    /// Generate this agent's next reply and commit it to memory.
    pub async fn respond(&mut self, config: &GenerationConfig) -> Result<String> {
        let reply = self.client.chat(self.memory.messages(), config).await?;
        self.memory.push_assistant(reply.clone());
        Ok(reply)
    }
}

// ─────────────────────────────────────────────
// Dialogue
// ─────────────────────────────────────────────

/// One entry of the recorded exchange.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DialogueTurn {
    pub turn: u32,
    pub speaker: String,
    pub message: String,
}

/// A dialogue between two agents, with its recorded history.
pub struct Dialogue {
    first: DialogueAgent,
    second: DialogueAgent,
    history: Vec<DialogueTurn>,
}

impl Dialogue {
    pub fn new(first: DialogueAgent, second: DialogueAgent) -> Self {
        Dialogue {
            first,
            second,
            history: Vec::new(),
        }
    }

    /// Everything said so far, including the seeding message (turn 0,
    /// speaker `"user"`).
    pub fn history(&self) -> &[DialogueTurn] {
        &self.history
    }

    /// Run the exchange: seed the first agent with `initial_message`, then
    /// alternate speakers for `max_turns` turns.
    ///
    /// On a completion failure the error propagates; history up to that
    /// point is retained for inspection.
    pub async fn conduct(
        &mut self,
        initial_message: &str,
        max_turns: u32,
        config: &GenerationConfig,
    ) -> Result<&[DialogueTurn]> {
        self.first.hear(initial_message);
        self.history.push(DialogueTurn {
            turn: 0,
            speaker: "user".to_string(),
            message: initial_message.to_string(),
        });

        let mut speaker = &mut self.first;
        let mut listener = &mut self.second;

        for turn in 0..max_turns {
            let reply = speaker.respond(config).await?;
            debug!(turn = turn + 1, speaker = speaker.name(), "dialogue turn complete");

            self.history.push(DialogueTurn {
                turn: turn + 1,
                speaker: speaker.name().to_string(),
                message: reply.clone(),
            });
            listener.hear(reply);

            std::mem::swap(&mut speaker, &mut listener);
        }

        Ok(&self.history)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
