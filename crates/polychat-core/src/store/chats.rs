//! Saved-chat store.
//!
//! File format: one JSON object per saved conversation in
//! `~/.polychat/chats/{name}.json`:
//!
//! ```json
//! { "messages": [{"role": "user", "content": "hi"}, ...],
//!   "saved_at": "2025-01-01T12:00:00Z" }
//! ```
//!
//! Records are immutable after save — re-saving under the same name writes a
//! new record over the old one, there is no in-place mutation.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ChatError, Result};
use crate::types::Message;
use crate::utils;

/// A persisted conversation plus its save timestamp.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatRecord {
    pub messages: Vec<Message>,
    pub saved_at: DateTime<Utc>,
}

/// Listing entry for a saved chat.
#[derive(Clone, Debug)]
pub struct ChatSummary {
    /// Record name (filename stem).
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub message_count: usize,
}

/// Export payload — same message list, download-only.
#[derive(Serialize)]
struct ChatExport<'a> {
    messages: &'a [Message],
    exported_at: DateTime<Utc>,
}

/// Store for saved conversations.
pub struct ChatStore {
    dir: PathBuf,
}

impl ChatStore {
    /// Create a chat store rooted at `dir` (default `~/.polychat/chats/`).
    /// The directory is created if it doesn't exist.
    pub fn new(dir: Option<PathBuf>) -> Result<Self> {
        let dir = dir.unwrap_or_else(utils::get_chats_path);
        std::fs::create_dir_all(&dir)?;
        Ok(ChatStore { dir })
    }

    /// Save a conversation. Returns the record name actually used.
    ///
    /// `name` is sanitized; when omitted, a timestamp-derived name like
    /// `chat_20250101_120000` is generated.
    pub fn save(&self, messages: &[Message], name: Option<&str>) -> Result<String> {
        let name = match name {
            Some(n) => utils::sanitize_name(n),
            None => format!("chat_{}", utils::file_timestamp()),
        };

        let record = ChatRecord {
            messages: messages.to_vec(),
            saved_at: Utc::now(),
        };
        self.write_record(&name, &record)?;
        debug!(name = %name, messages = messages.len(), "saved chat");
        Ok(name)
    }

    /// Load a saved chat by name.
    pub fn load(&self, name: &str) -> Result<ChatRecord> {
        let path = self.record_path(name);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            ChatError::Persistence(format!("cannot read chat '{}': {}", name, e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// List saved chats, newest first.
    pub fn list(&self) -> Result<Vec<ChatSummary>> {
        let mut summaries = Vec::new();

        for entry in std::fs::read_dir(&self.dir)?.flatten() {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s.to_string(),
                None => continue,
            };
            match std::fs::read_to_string(&path)
                .map_err(ChatError::from)
                .and_then(|c| Ok(serde_json::from_str::<ChatRecord>(&c)?))
            {
                Ok(record) => summaries.push(ChatSummary {
                    name,
                    saved_at: record.saved_at,
                    message_count: record.messages.len(),
                }),
                Err(e) => {
                    // A single corrupt file should not hide the rest
                    warn!(file = %path.display(), error = %e, "skipping unreadable chat record");
                }
            }
        }

        summaries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(summaries)
    }

    /// Delete a saved chat. Returns `true` if the record existed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        debug!(name = %name, "deleted chat record");
        Ok(true)
    }

    /// Render a conversation as a download-ready JSON export.
    pub fn export(messages: &[Message]) -> Result<String> {
        let export = ChatExport {
            messages,
            exported_at: Utc::now(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", utils::sanitize_name(name)))
    }

    /// Write via a temp file and rename, so a failed write never truncates
    /// an existing record.
    fn write_record(&self, name: &str, record: &ChatRecord) -> Result<()> {
        let path = self.record_path(name);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(record)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
