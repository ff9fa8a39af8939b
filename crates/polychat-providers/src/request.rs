//! Request normalization — building a provider-specific completion request
//! from a conversation and generation parameters.
//!
//! The base shape (`model`, `messages`, `temperature`, `max_tokens`, `top_p`,
//! `stream`) is common to every provider; class-specific augmentation is a
//! pure function of [`ProviderClass`], matched exhaustively.

use serde::Serialize;

use polychat_core::error::{ChatError, Result};
use polychat_core::types::{GenerationConfig, Message, Role};

use crate::registry::{CredentialSource, ProviderClass, ProviderSpec};

// ─────────────────────────────────────────────
// Request payload
// ─────────────────────────────────────────────

/// Structured-output directive (`{"type": "json_object"}`).
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        ResponseFormat {
            format_type: "json_object".to_string(),
        }
    }
}

/// A normalized, provider-ready completion request.
///
/// Fields beyond the common set are populated only for the provider classes
/// that need them and are omitted from the wire format otherwise.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub stream: bool,

    /// Embedded credential (AnthropicLike, AzureLike).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Duplicate model identifier (AnthropicLike request shape).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Azure-style endpoint dispatch flag (AzureLike).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure: Option<bool>,
    /// Structured-output directive, when JSON mode is requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

// ─────────────────────────────────────────────
// build_request
// ─────────────────────────────────────────────

/// Build a normalized request for `spec`.
///
/// Fails with `UnsupportedModel` when `model` is not in the provider's list,
/// `InvalidConversation` when the system-message invariant is violated, and
/// `UnsupportedFeature` when JSON mode is requested from a provider class
/// that has no structured-output directive.
pub fn build_request(
    spec: &ProviderSpec,
    model: &str,
    messages: &[Message],
    config: &GenerationConfig,
    credentials: &dyn CredentialSource,
) -> Result<CompletionRequest> {
    if !spec.supports_model(model) {
        return Err(ChatError::UnsupportedModel {
            provider: spec.name.to_string(),
            model: model.to_string(),
        });
    }
    validate_conversation(messages)?;

    let config = config.clamped();
    let mut request = CompletionRequest {
        model: model.to_string(),
        messages: messages.to_vec(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        top_p: config.top_p,
        stream: config.stream,
        api_key: None,
        model_name: None,
        azure: None,
        response_format: None,
    };

    match spec.class {
        ProviderClass::Default => {
            // Credential travels via the ambient env channel, not the payload.
        }
        ProviderClass::AnthropicLike => {
            request.api_key = Some(credentials.lookup(spec.env_key).unwrap_or_default());
            request.model_name = Some(model.to_string());
        }
        ProviderClass::AzureLike => {
            request.api_key = Some(credentials.lookup(spec.env_key).unwrap_or_default());
            request.azure = Some(true);
        }
    }

    if config.json_mode {
        match spec.class {
            ProviderClass::Default | ProviderClass::AzureLike => {
                request.response_format = Some(ResponseFormat::json_object());
            }
            // The Anthropic messages API has no response_format field.
            ProviderClass::AnthropicLike => {
                return Err(ChatError::UnsupportedFeature {
                    provider: spec.name.to_string(),
                    feature: "JSON response mode".to_string(),
                });
            }
        }
    }

    Ok(request)
}

/// Enforce the conversation invariant: at most one system message, and if
/// present it must be the first entry. Turn ordering beyond that is the
/// caller's business and is preserved as-is.
fn validate_conversation(messages: &[Message]) -> Result<()> {
    for (i, msg) in messages.iter().enumerate() {
        if msg.role == Role::System && i != 0 {
            let reason = if messages[0].role == Role::System {
                "more than one system message"
            } else {
                "system message is not first"
            };
            return Err(ChatError::InvalidConversation(reason.to_string()));
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
