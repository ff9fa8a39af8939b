//! Configuration — default generation parameters and per-provider endpoint
//! overrides, loaded from `~/.polychat/config.json`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! A missing or unreadable file falls back to defaults with a warning —
//! configuration problems are never fatal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::types::GenerationConfig;
use crate::utils;

// ─────────────────────────────────────────────
// Schema
// ─────────────────────────────────────────────

/// Root configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub defaults: GenerationDefaults,
    /// Per-provider API base overrides, keyed by registry name
    /// (e.g. `"azure"` → a deployment endpoint, or a local proxy).
    pub api_bases: HashMap<String, String>,
}

/// Default generation parameters applied to new requests.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationDefaults {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub streaming: bool,
    pub json_format: bool,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        GenerationDefaults {
            temperature: 0.7,
            max_tokens: 256,
            top_p: 1.0,
            streaming: true,
            json_format: false,
        }
    }
}

impl Config {
    /// Build a per-request [`GenerationConfig`] from the configured defaults.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.defaults.temperature,
            max_tokens: self.defaults.max_tokens,
            top_p: self.defaults.top_p,
            stream: self.defaults.streaming,
            json_mode: self.defaults.json_format,
        }
    }

    /// Configured API base for a provider, if any.
    pub fn api_base(&self, provider: &str) -> Option<&str> {
        self.api_bases.get(provider).map(String::as_str)
    }
}

// ─────────────────────────────────────────────
// Load / save
// ─────────────────────────────────────────────

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    utils::get_data_path().join("config.json")
}

/// Load configuration from the default path (or an explicit one).
///
/// Falls back to `Config::default()` if the file doesn't exist or can't
/// be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if !config_path.exists() {
        info!("No config file found at {}, using defaults", config_path.display());
        return Config::default();
    }

    debug!("Loading config from {}", config_path.display());

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", config_path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&config_path, json)?;
    debug!("Saved config to {}", config_path.display());
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.defaults.temperature, 0.7);
        assert_eq!(config.defaults.max_tokens, 256);
        assert_eq!(config.defaults.top_p, 1.0);
        assert!(config.defaults.streaming);
        assert!(!config.defaults.json_format);
    }

    #[test]
    fn test_generation_config_from_defaults() {
        let gen = Config::default().generation_config();
        assert_eq!(gen.max_tokens, 256);
        assert!(gen.stream);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("nope.json")));
        assert_eq!(config.defaults.max_tokens, 256);
    }

    #[test]
    fn test_load_invalid_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{broken").unwrap();
        let config = load_config(Some(&path));
        assert_eq!(config.defaults.temperature, 0.7);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.defaults.max_tokens = 1024;
        config.defaults.streaming = false;
        config
            .api_bases
            .insert("azure".to_string(), "https://my-deploy.example.com/v1".to_string());

        save_config(&config, Some(&path)).unwrap();
        let loaded = load_config(Some(&path));

        assert_eq!(loaded.defaults.max_tokens, 1024);
        assert!(!loaded.defaults.streaming);
        assert_eq!(
            loaded.api_base("azure"),
            Some("https://my-deploy.example.com/v1")
        );
    }

    #[test]
    fn test_camel_case_keys_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        save_config(&Config::default(), Some(&path)).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("maxTokens"));
        assert!(raw.contains("jsonFormat"));
        assert!(!raw.contains("max_tokens"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"defaults": {"temperature": 0.2}}"#).unwrap();

        let config = load_config(Some(&path));
        assert_eq!(config.defaults.temperature, 0.2);
        assert_eq!(config.defaults.max_tokens, 256);
    }
}
