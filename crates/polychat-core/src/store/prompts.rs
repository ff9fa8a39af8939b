//! System-prompt store.
//!
//! One Markdown file per prompt in `~/.polychat/system_prompts/{name}.md`.
//! An optional leading `---`-delimited frontmatter block carries a
//! `description:` line; everything after it is the prompt body verbatim
//! (it may contain `{variable}` placeholders — they are opaque here).
//!
//! The prompt's name is the sanitized filename stem; saving under a name
//! that sanitizes to an existing stem overwrites that prompt.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{ChatError, Result};
use crate::utils;

/// A stored system prompt.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemPromptRecord {
    /// Unique name, derived from the sanitized filename.
    pub name: String,
    /// Prompt body, verbatim.
    pub body: String,
    pub description: Option<String>,
    pub modified_at: DateTime<Utc>,
}

/// Store for system prompts.
pub struct PromptStore {
    dir: PathBuf,
}

impl PromptStore {
    /// Create a prompt store rooted at `dir` (default
    /// `~/.polychat/system_prompts/`). The directory is created if missing.
    pub fn new(dir: Option<PathBuf>) -> Result<Self> {
        let dir = dir.unwrap_or_else(utils::get_prompts_path);
        std::fs::create_dir_all(&dir)?;
        Ok(PromptStore { dir })
    }

    /// Save a prompt. Returns the sanitized name actually used.
    ///
    /// The description must be a single line; a body that itself starts with
    /// `---` is written behind a frontmatter block so it still round-trips
    /// verbatim.
    pub fn save(&self, name: &str, body: &str, description: Option<&str>) -> Result<String> {
        let name = utils::sanitize_name(name);
        if name.is_empty() {
            return Err(ChatError::Persistence(
                "prompt name sanitizes to an empty string".to_string(),
            ));
        }
        if description.is_some_and(|d| d.contains('\n')) {
            return Err(ChatError::Persistence(
                "prompt description must be a single line".to_string(),
            ));
        }

        let desc = description.unwrap_or("").trim();
        let content = if !desc.is_empty() || body.starts_with("---") {
            format!("---\ndescription: {}\n---\n{}", desc, body)
        } else {
            body.to_string()
        };

        let path = self.prompt_path(&name);
        let tmp = path.with_extension("md.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &path)?;
        debug!(name = %name, "saved system prompt");
        Ok(name)
    }

    /// Load one prompt by name.
    pub fn load(&self, name: &str) -> Result<SystemPromptRecord> {
        let path = self.prompt_path(&utils::sanitize_name(name));
        self.load_path(&path)
    }

    /// Load every prompt in the store, sorted by name.
    pub fn load_all(&self) -> Result<Vec<SystemPromptRecord>> {
        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.dir)?.flatten() {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "md") {
                continue;
            }
            if let Ok(record) = self.load_path(&path) {
                records.push(record);
            }
        }
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    /// Delete a prompt. Returns `true` if it existed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let path = self.prompt_path(&utils::sanitize_name(name));
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        debug!(name = %name, "deleted system prompt");
        Ok(true)
    }

    fn prompt_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.md", name))
    }

    fn load_path(&self, path: &Path) -> Result<SystemPromptRecord> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ChatError::Persistence(format!("bad prompt path: {}", path.display())))?
            .to_string();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ChatError::Persistence(format!("cannot read prompt '{}': {}", name, e))
        })?;

        let modified_at = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let (description, body) = split_frontmatter(&content);

        Ok(SystemPromptRecord {
            name,
            body: body.to_string(),
            description,
            modified_at,
        })
    }
}

/// Split an optional leading frontmatter block from the body.
///
/// Frontmatter is only recognized when the file starts with `---` on its own
/// line; an unterminated block is treated as plain body.
fn split_frontmatter(content: &str) -> (Option<String>, &str) {
    let Some(rest) = content.strip_prefix("---\n") else {
        return (None, content);
    };
    let Some(end) = rest.find("\n---\n") else {
        return (None, content);
    };

    let block = &rest[..end];
    let body = &rest[end + "\n---\n".len()..];

    let description = block
        .lines()
        .find_map(|line| {
            line.strip_prefix("description:")
                .map(|d| d.trim().to_string())
        })
        .filter(|d| !d.is_empty());

    (description, body)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
