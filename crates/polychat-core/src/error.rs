//! Error kinds for the chat core.
//!
//! Every failure is scoped to the single request or file operation that
//! produced it — nothing here is fatal to the process. The CLI reports the
//! error and leaves prior state (conversation so far, prompt list) unchanged.

use thiserror::Error;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ChatError>;

/// All error kinds surfaced by the registry, normalizer, transport, and stores.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The provider name is not in the registry.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// The model is not in the provider's model list.
    #[error("model '{model}' is not available for provider '{provider}'")]
    UnsupportedModel { provider: String, model: String },

    /// The provider class is known not to support a requested feature.
    #[error("provider '{provider}' does not support {feature}")]
    UnsupportedFeature { provider: String, feature: String },

    /// The conversation violates the system-message invariant
    /// (at most one, and it must come first).
    #[error("invalid conversation: {0}")]
    InvalidConversation(String),

    /// A response or chunk is missing the expected field path.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Network, auth, or rate-limit failure from the completion transport.
    /// The underlying cause is passed through as text.
    #[error("transport error: {0}")]
    Transport(String),

    /// File read/write/delete failure in a store.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<std::io::Error> for ChatError {
    fn from(e: std::io::Error) -> Self {
        ChatError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Persistence(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unknown_provider() {
        let e = ChatError::UnknownProvider("mistral".to_string());
        assert_eq!(e.to_string(), "unknown provider: mistral");
    }

    #[test]
    fn test_display_unsupported_model() {
        let e = ChatError::UnsupportedModel {
            provider: "azure".to_string(),
            model: "gpt-4o".to_string(),
        };
        assert!(e.to_string().contains("gpt-4o"));
        assert!(e.to_string().contains("azure"));
    }

    #[test]
    fn test_io_error_maps_to_persistence() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let e: ChatError = io.into();
        assert!(matches!(e, ChatError::Persistence(_)));
    }

    #[test]
    fn test_json_error_maps_to_persistence() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let e: ChatError = bad.into();
        assert!(matches!(e, ChatError::Persistence(_)));
    }
}
