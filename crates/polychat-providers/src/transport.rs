//! Completion transport — the HTTP boundary to the provider APIs.
//!
//! Talks to `/chat/completions`-style endpoints via `reqwest`. Non-streamed
//! calls return the raw response body as JSON; streamed calls return a lazy
//! pull-based stream of text deltas parsed from SSE events.
//!
//! One request at a time, no retries, no cancellation — once sent, a request
//! runs to completion, stream end, or transport failure.

use std::pin::Pin;
use std::time::Duration;

use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, error};

use polychat_core::error::{ChatError, Result};

use crate::registry::{CredentialSource, ProviderSpec};
use crate::request::CompletionRequest;
use crate::response::extract_delta;

/// Lazy sequence of incremental text deltas from a streamed completion.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

// ─────────────────────────────────────────────
// HttpTransport
// ─────────────────────────────────────────────

/// HTTP client bound to one provider's endpoint and credential.
pub struct HttpTransport {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("api_base", &self.api_base)
            .field("provider", &self.spec.display_name)
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport for `spec`.
    ///
    /// `api_base` overrides the spec default (Azure deployments, proxies,
    /// mock servers). The bearer credential is resolved once, here.
    pub fn new(
        spec: &'static ProviderSpec,
        credentials: &dyn CredentialSource,
        api_base: Option<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        HttpTransport {
            client,
            api_base: api_base.unwrap_or_else(|| spec.default_api_base.to_string()),
            api_key: credentials.lookup(spec.env_key).unwrap_or_default(),
            spec,
        }
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    async fn send(&self, request: &CompletionRequest) -> Result<reqwest::Response> {
        let url = self.completions_url();
        debug!(
            provider = self.spec.display_name,
            model = %request.model,
            stream = request.stream,
            "sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = self.spec.display_name, error = %e, "HTTP request failed");
                ChatError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            error!(provider = self.spec.display_name, status = %status, body = %body, "API error");
            return Err(ChatError::Transport(format!("{} — {}", status, body)));
        }

        Ok(response)
    }

    /// Issue a non-streamed completion; returns the raw response body.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<Value> {
        let response = self.send(request).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ChatError::MalformedResponse(format!("unparseable body: {e}")))
    }

    /// Issue a streamed completion; returns a stream of text deltas.
    ///
    /// SSE events are decoded in arrival order; a `[DONE]` sentinel ends the
    /// stream, empty deltas (control chunks) are dropped, and a chunk that
    /// can't be parsed surfaces `MalformedResponse` through the stream.
    pub async fn stream(&self, request: &CompletionRequest) -> Result<DeltaStream> {
        let response = self.send(request).await?;
        let class = self.spec.class;

        let deltas = response
            .bytes_stream()
            .eventsource()
            .map(move |event| match event {
                Err(e) => Some(Err(ChatError::Transport(e.to_string()))),
                Ok(event) => {
                    let data = event.data.trim().to_string();
                    if data == "[DONE]" {
                        return None;
                    }
                    match serde_json::from_str::<Value>(&data) {
                        Ok(chunk) => Some(extract_delta(class, &chunk)),
                        Err(e) => Some(Err(ChatError::MalformedResponse(format!(
                            "unparseable chunk: {e}"
                        )))),
                    }
                }
            })
            .take_while(|item| futures::future::ready(item.is_some()))
            .filter_map(|item| async move {
                match item {
                    Some(Ok(delta)) if delta.is_empty() => None,
                    Some(other) => Some(other),
                    None => None,
                }
            });

        Ok(Box::pin(deltas))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{resolve, tests::MapCredentials};
    use crate::request::build_request;
    use polychat_core::types::{GenerationConfig, Message};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn openai_transport(server: &MockServer, key: &str) -> HttpTransport {
        let spec = resolve("openai").unwrap();
        let creds = MapCredentials::with(&[("OPENAI_API_KEY", key)]);
        HttpTransport::new(spec, &creds, Some(server.uri()))
    }

    fn request(stream: bool) -> CompletionRequest {
        let spec = resolve("openai").unwrap();
        let creds = MapCredentials::with(&[("OPENAI_API_KEY", "test-key")]);
        let config = GenerationConfig {
            stream,
            ..GenerationConfig::default()
        };
        build_request(spec, "gpt-4o", &[Message::user("hi")], &config, &creds).unwrap()
    }

    #[test]
    fn test_completions_url_trailing_slash() {
        let spec = resolve("openai").unwrap();
        let creds = MapCredentials::with(&[]);
        let transport =
            HttpTransport::new(spec, &creds, Some("https://api.openai.com/v1/".to_string()));
        assert_eq!(
            transport.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_api_base_from_spec() {
        let spec = resolve("anthropic").unwrap();
        let creds = MapCredentials::with(&[]);
        let transport = HttpTransport::new(spec, &creds, None);
        assert_eq!(transport.api_base, "https://api.anthropic.com/v1");
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-test",
                "choices": [{
                    "message": { "content": "Hello!" },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let transport = openai_transport(&server, "test-key-123");
        let body = transport.complete(&request(false)).await.unwrap();
        assert_eq!(body["choices"][0]["message"]["content"], "Hello!");
    }

    #[tokio::test]
    async fn test_complete_api_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "message": "Rate limit exceeded" }
            })))
            .mount(&server)
            .await;

        let transport = openai_transport(&server, "key");
        let err = transport.complete(&request(false)).await.unwrap_err();
        match err {
            ChatError::Transport(msg) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("Rate limit"));
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_network_error_is_transport() {
        let spec = resolve("openai").unwrap();
        let creds = MapCredentials::with(&[]);
        // Port that isn't listening
        let transport = HttpTransport::new(spec, &creds, Some("http://127.0.0.1:1".to_string()));

        let err = transport.complete(&request(false)).await.unwrap_err();
        assert!(matches!(err, ChatError::Transport(_)));
    }

    #[tokio::test]
    async fn test_complete_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let transport = openai_transport(&server, "key");
        let err = transport.complete(&request(false)).await.unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_stream_concatenates_deltas() {
        let server = MockServer::start().await;
        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(sse.as_bytes(), "text/event-stream"),
            )
            .mount(&server)
            .await;

        let transport = openai_transport(&server, "key");
        let mut stream = transport.stream(&request(true)).await.unwrap();

        let mut collected = String::new();
        while let Some(delta) = stream.next().await {
            collected.push_str(&delta.unwrap());
        }
        assert_eq!(collected, "Hello");
    }

    #[tokio::test]
    async fn test_stream_malformed_chunk_surfaces_error() {
        let server = MockServer::start().await;
        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n",
            "data: not json at all\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(sse.as_bytes(), "text/event-stream"),
            )
            .mount(&server)
            .await;

        let transport = openai_transport(&server, "key");
        let mut stream = transport.stream(&request(true)).await.unwrap();

        assert_eq!(stream.next().await.unwrap().unwrap(), "ok");
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_stream_error_status_fails_before_streaming() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let transport = openai_transport(&server, "key");
        let err = transport.stream(&request(true)).await.err().unwrap();
        assert!(matches!(err, ChatError::Transport(_)));
    }
}
