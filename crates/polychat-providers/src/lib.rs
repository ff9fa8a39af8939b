//! Provider layer for Polychat — the registry of supported LLM providers and
//! the request/response normalization around them.
//!
//! # Architecture
//!
//! - [`registry`] — static provider specs, credential-aware availability
//! - [`request`] — [`request::build_request`], conversation validation,
//!   class-specific payload augmentation
//! - [`response`] — text extraction from responses and streamed chunks
//! - [`stream`] — delta accumulation and the per-request state machine
//! - [`transport`] — reqwest HTTP client with SSE streaming
//! - [`client`] — [`client::ChatClient`], the glued-together surface

pub mod client;
pub mod registry;
pub mod request;
pub mod response;
pub mod stream;
pub mod transport;

// Re-export main types for convenience
pub use client::{ChatClient, CompletionClient};
pub use registry::{
    list_available, resolve, CredentialSource, EnvCredentials, ProviderClass, ProviderSpec,
    PROVIDERS,
};
pub use request::{build_request, CompletionRequest};
pub use response::{extract_delta, extract_text};
pub use stream::{accumulate, RequestState, StreamAccumulator};
pub use transport::{DeltaStream, HttpTransport};
