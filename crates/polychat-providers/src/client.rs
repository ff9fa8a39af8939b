//! High-level completion client — registry, normalizer, and transport glued
//! into one "send a conversation, get text back" surface.
//!
//! The [`CompletionClient`] trait is the seam consumers (the dialogue loop,
//! the CLI, tests) program against; [`ChatClient`] is the HTTP-backed
//! implementation.

use async_trait::async_trait;

use polychat_core::error::Result;
use polychat_core::types::{GenerationConfig, Message};

use crate::registry::{self, CredentialSource, ProviderSpec};
use crate::request::build_request;
use crate::response::extract_text;
use crate::transport::{DeltaStream, HttpTransport};

/// Anything that can turn a conversation into assistant text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion cycle and return the full assistant text.
    async fn chat(&self, messages: &[Message], config: &GenerationConfig) -> Result<String>;
}

// ─────────────────────────────────────────────
// ChatClient
// ─────────────────────────────────────────────

/// HTTP-backed completion client bound to one provider and model.
pub struct ChatClient {
    spec: &'static ProviderSpec,
    model: String,
    credentials: Box<dyn CredentialSource + Send + Sync>,
    transport: HttpTransport,
}

impl ChatClient {
    /// Create a client for `provider`/`model`.
    ///
    /// Fails with `UnknownProvider` or `UnsupportedModel` up front, so a
    /// misconfigured client can't be constructed.
    pub fn new(
        provider: &str,
        model: &str,
        credentials: Box<dyn CredentialSource + Send + Sync>,
        api_base: Option<String>,
    ) -> Result<Self> {
        let spec = registry::resolve(provider)?;
        if !spec.supports_model(model) {
            return Err(polychat_core::error::ChatError::UnsupportedModel {
                provider: spec.name.to_string(),
                model: model.to_string(),
            });
        }
        let transport = HttpTransport::new(spec, credentials.as_ref(), api_base);
        Ok(ChatClient {
            spec,
            model: model.to_string(),
            credentials,
            transport,
        })
    }

    pub fn provider_name(&self) -> &str {
        self.spec.display_name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Non-streamed completion: one request, one response, extracted text.
    pub async fn complete(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<String> {
        let config = GenerationConfig {
            stream: false,
            ..config.clone()
        };
        let request = build_request(
            self.spec,
            &self.model,
            messages,
            &config,
            self.credentials.as_ref(),
        )?;
        let body = self.transport.complete(&request).await?;
        extract_text(self.spec.class, &body)
    }

    /// Streamed completion: a lazy stream of text deltas for incremental
    /// rendering.
    pub async fn stream_text(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<DeltaStream> {
        let config = GenerationConfig {
            stream: true,
            ..config.clone()
        };
        let request = build_request(
            self.spec,
            &self.model,
            messages,
            &config,
            self.credentials.as_ref(),
        )?;
        self.transport.stream(&request).await
    }

    /// Streamed completion, accumulated into the final text.
    pub async fn collect(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<String> {
        use futures::StreamExt;

        let mut stream = self.stream_text(messages, config).await?;
        let mut text = String::new();
        while let Some(delta) = stream.next().await {
            text.push_str(&delta?);
        }
        Ok(text)
    }
}

#[async_trait]
impl CompletionClient for ChatClient {
    async fn chat(&self, messages: &[Message], config: &GenerationConfig) -> Result<String> {
        if config.stream {
            self.collect(messages, config).await
        } else {
            self.complete(messages, config).await
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
