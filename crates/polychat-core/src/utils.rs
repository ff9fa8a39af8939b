//! Utility helpers — path resolution, timestamps, filename sanitization.

use std::path::PathBuf;

/// Get the Polychat data directory (e.g. `~/.polychat/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".polychat")
}

/// Get the saved-chats directory (e.g. `~/.polychat/chats/`).
pub fn get_chats_path() -> PathBuf {
    get_data_path().join("chats")
}

/// Get the system-prompts directory (e.g. `~/.polychat/system_prompts/`).
pub fn get_prompts_path() -> PathBuf {
    get_data_path().join("system_prompts")
}

/// Current ISO 8601 timestamp.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Compact local timestamp used for default chat filenames.
pub fn file_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Sanitize a record name for use as a filename stem.
///
/// Keeps alphanumerics, `-`, and `_`; everything else (including `.` and
/// path separators) becomes `_`, so a stem can never escape its directory
/// or smuggle an extension.
pub fn sanitize_name(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
