//! Provider registry — static specs for the supported LLM providers.
//!
//! Each [`ProviderSpec`] names a provider, its credential key, its supported
//! models, and its request-shape class. The table is immutable and defined
//! at process start; everything downstream resolves a spec once and matches
//! on [`ProviderClass`] exhaustively.

use polychat_core::error::{ChatError, Result};

// ─────────────────────────────────────────────
// ProviderSpec
// ─────────────────────────────────────────────

/// Request/response shape class of a provider.
///
/// Matched exhaustively in the normalizer, so adding a variant forces every
/// provider-specific branch to be revisited at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderClass {
    /// OpenAI-compatible; credential travels via the ambient env channel.
    Default,
    /// Anthropic request shape: credential embedded, model duplicated
    /// under `model_name`.
    AnthropicLike,
    /// Azure endpoint dispatch: credential embedded plus an `azure`
    /// routing flag.
    AzureLike,
}

/// Static specification describing one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"anthropic"`).
    pub name: &'static str,
    /// Human-readable name for listings and logs.
    pub display_name: &'static str,
    /// Credential-lookup key (an environment variable name).
    pub env_key: &'static str,
    /// Request-shape class.
    pub class: ProviderClass,
    /// Supported model identifiers, in menu order.
    pub models: &'static [&'static str],
    /// Default API base URL for the completion endpoint.
    pub default_api_base: &'static str,
}

impl ProviderSpec {
    /// Whether `model` is in this provider's model list.
    pub fn supports_model(&self, model: &str) -> bool {
        self.models.contains(&model)
    }
}

// ─────────────────────────────────────────────
// Registry table (declaration order is the UI menu order)
// ─────────────────────────────────────────────

/// All registered providers.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "openai",
        display_name: "OpenAI (Default)",
        env_key: "OPENAI_API_KEY",
        class: ProviderClass::Default,
        models: &["gpt-4o", "gpt-4o-mini", "gpt-3.5-turbo"],
        default_api_base: "https://api.openai.com/v1",
    },
    ProviderSpec {
        name: "openai-backup",
        display_name: "OpenAI (Backup)",
        env_key: "OPENAI_API_KEY_BACKUP",
        class: ProviderClass::Default,
        models: &["gpt-4o", "gpt-4o-mini", "gpt-3.5-turbo"],
        default_api_base: "https://api.openai.com/v1",
    },
    ProviderSpec {
        name: "anthropic",
        display_name: "Anthropic",
        env_key: "ANTHROPIC_API_KEY",
        class: ProviderClass::AnthropicLike,
        models: &[
            "claude-3-opus-20240229",
            "claude-3-sonnet-20240229",
            "claude-2.1",
        ],
        default_api_base: "https://api.anthropic.com/v1",
    },
    ProviderSpec {
        name: "azure",
        display_name: "Azure",
        env_key: "AZURE_API_KEY",
        class: ProviderClass::AzureLike,
        models: &["gpt-4", "gpt-3.5-turbo"],
        // Azure deployments have per-resource endpoints; this is overridden
        // via config in any real setup.
        default_api_base: "https://example.openai.azure.com/v1",
    },
];

/// Resolve a provider spec by internal or display name.
pub fn resolve(name: &str) -> Result<&'static ProviderSpec> {
    PROVIDERS
        .iter()
        .find(|spec| spec.name == name || spec.display_name == name)
        .ok_or_else(|| ChatError::UnknownProvider(name.to_string()))
}

// ─────────────────────────────────────────────
// Credential source
// ─────────────────────────────────────────────

/// Source of provider credentials (env, secret store, interactive prompt).
///
/// The registry and normalizer treat returned values opaquely; acquisition
/// is the collaborator's concern.
pub trait CredentialSource {
    /// The secret for `key`, or `None` when absent/empty.
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Credentials read from the process environment.
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// Providers whose credential is present, preserving declaration order.
pub fn list_available(credentials: &dyn CredentialSource) -> Vec<&'static ProviderSpec> {
    PROVIDERS
        .iter()
        .filter(|spec| credentials.lookup(spec.env_key).is_some())
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
