//! Stream accumulation and the per-request lifecycle.
//!
//! A streamed completion is consumed pull-style: the transport (or a test)
//! feeds chunks into a [`StreamAccumulator`] in arrival order and the final
//! text is exactly the concatenation of the extracted deltas — no
//! reordering, no deduplication. The underlying transport is not replayable;
//! restarting means re-issuing the request.

use serde_json::Value;

use polychat_core::error::Result;

use crate::registry::ProviderClass;
use crate::response::extract_delta;

// ─────────────────────────────────────────────
// Request lifecycle
// ─────────────────────────────────────────────

/// Lifecycle of a single completion request.
///
/// `Idle -> Sent -> Streaming* -> Complete`, or `Sent -> Complete` for
/// non-streamed calls, with `-> Failed` from `Sent`/`Streaming` on a
/// transport or parse error. `Complete` and `Failed` are terminal; there
/// are no retries at this layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Sent,
    Streaming,
    Complete,
    Failed,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Complete | RequestState::Failed)
    }
}

// ─────────────────────────────────────────────
// StreamAccumulator
// ─────────────────────────────────────────────

/// Concatenates streamed deltas into the final assistant text.
///
/// Created when the request is sent; each [`push`](Self::push) extracts the
/// chunk's delta and appends it. A parse failure moves the request to
/// `Failed` and further pushes are rejected.
#[derive(Debug)]
pub struct StreamAccumulator {
    class: ProviderClass,
    text: String,
    state: RequestState,
}

impl StreamAccumulator {
    /// Start accumulating for a request that has just been sent.
    pub fn new(class: ProviderClass) -> Self {
        StreamAccumulator {
            class,
            text: String::new(),
            state: RequestState::Sent,
        }
    }

    /// Consume one chunk; returns the delta that was appended.
    pub fn push(&mut self, chunk: &Value) -> Result<String> {
        debug_assert!(!self.state.is_terminal(), "push after terminal state");
        match extract_delta(self.class, chunk) {
            Ok(delta) => {
                self.state = RequestState::Streaming;
                self.text.push_str(&delta);
                Ok(delta)
            }
            Err(e) => {
                self.state = RequestState::Failed;
                Err(e)
            }
        }
    }

    /// Mark the request failed (transport-level error).
    pub fn fail(&mut self) {
        self.state = RequestState::Failed;
    }

    /// Text accumulated so far (what the UI has rendered).
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// End of stream: finishes the request and yields the final text.
    pub fn finish(mut self) -> String {
        self.state = RequestState::Complete;
        self.text
    }
}

/// Accumulate a whole chunk sequence at once.
///
/// Stops at the first malformed chunk, surfacing its error.
pub fn accumulate<'a>(
    class: ProviderClass,
    chunks: impl IntoIterator<Item = &'a Value>,
) -> Result<String> {
    let mut acc = StreamAccumulator::new(class);
    for chunk in chunks {
        acc.push(chunk)?;
    }
    Ok(acc.finish())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use polychat_core::error::ChatError;
    use serde_json::json;

    fn openai_chunk(text: &str) -> Value {
        json!({"choices": [{"delta": {"content": text}}]})
    }

    fn anthropic_chunk(text: &str) -> Value {
        json!({"delta": {"text": text}})
    }

    #[test]
    fn test_concatenation_in_arrival_order() {
        let chunks: Vec<Value> = ["Hel", "lo, ", "world"]
            .iter()
            .map(|t| openai_chunk(t))
            .collect();
        let text = accumulate(ProviderClass::Default, &chunks).unwrap();
        assert_eq!(text, "Hello, world");
    }

    #[test]
    fn test_split_invariance() {
        // Any split of the same total sequence yields the same final string
        let a: Vec<Value> = ["Hel", "lo, ", "world"].iter().map(|t| openai_chunk(t)).collect();
        let b: Vec<Value> = ["Hello", ", world"].iter().map(|t| openai_chunk(t)).collect();
        let c: Vec<Value> = ["Hello, world"].iter().map(|t| openai_chunk(t)).collect();

        let ta = accumulate(ProviderClass::Default, &a).unwrap();
        let tb = accumulate(ProviderClass::Default, &b).unwrap();
        let tc = accumulate(ProviderClass::Default, &c).unwrap();
        assert_eq!(ta, tb);
        assert_eq!(tb, tc);
    }

    #[test]
    fn test_anthropic_chunks() {
        let chunks: Vec<Value> = ["안녕", "하세요"].iter().map(|t| anthropic_chunk(t)).collect();
        let text = accumulate(ProviderClass::AnthropicLike, &chunks).unwrap();
        assert_eq!(text, "안녕하세요");
    }

    #[test]
    fn test_empty_deltas_contribute_nothing() {
        let chunks = vec![
            openai_chunk("a"),
            json!({"choices": [{"delta": {}, "finish_reason": "stop"}]}),
            openai_chunk("b"),
        ];
        let text = accumulate(ProviderClass::Default, &chunks).unwrap();
        assert_eq!(text, "ab");
    }

    #[test]
    fn test_no_deduplication() {
        let chunks: Vec<Value> = ["ha", "ha", "ha"].iter().map(|t| openai_chunk(t)).collect();
        assert_eq!(accumulate(ProviderClass::Default, &chunks).unwrap(), "hahaha");
    }

    #[test]
    fn test_state_transitions() {
        let mut acc = StreamAccumulator::new(ProviderClass::Default);
        assert_eq!(acc.state(), RequestState::Sent);

        acc.push(&openai_chunk("x")).unwrap();
        assert_eq!(acc.state(), RequestState::Streaming);
        assert_eq!(acc.text(), "x");

        let text = acc.finish();
        assert_eq!(text, "x");
    }

    #[test]
    fn test_non_streamed_path_sent_to_complete() {
        let acc = StreamAccumulator::new(ProviderClass::Default);
        assert_eq!(acc.state(), RequestState::Sent);
        assert_eq!(acc.finish(), "");
    }

    #[test]
    fn test_malformed_chunk_fails_request() {
        let mut acc = StreamAccumulator::new(ProviderClass::Default);
        acc.push(&openai_chunk("partial")).unwrap();

        let err = acc.push(&json!({"unexpected": true})).unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
        assert_eq!(acc.state(), RequestState::Failed);
        // Text rendered so far is still inspectable
        assert_eq!(acc.text(), "partial");
    }

    #[test]
    fn test_transport_failure_marks_failed() {
        let mut acc = StreamAccumulator::new(ProviderClass::AnthropicLike);
        acc.fail();
        assert_eq!(acc.state(), RequestState::Failed);
        assert!(acc.state().is_terminal());
    }

    #[test]
    fn test_terminal_states() {
        assert!(RequestState::Complete.is_terminal());
        assert!(RequestState::Failed.is_terminal());
        assert!(!RequestState::Idle.is_terminal());
        assert!(!RequestState::Sent.is_terminal());
        assert!(!RequestState::Streaming.is_terminal());
    }
}
