//! Response normalization — pulling assistant text out of provider-specific
//! response bodies and streamed chunks.
//!
//! The field paths are class-specific:
//!
//! | class         | full response                 | streamed chunk              |
//! |---------------|-------------------------------|-----------------------------|
//! | AnthropicLike | `content`                     | `delta.text`                |
//! | others        | `choices[0].message.content`  | `choices[0].delta.content`  |

use serde::Deserialize;
use serde_json::Value;

use polychat_core::error::{ChatError, Result};

use crate::registry::ProviderClass;

// ─────────────────────────────────────────────
// Wire shapes (deserialization only)
// ─────────────────────────────────────────────

#[derive(Deserialize)]
struct ChoicesResponse {
    choices: Vec<ResponseChoice>,
}

#[derive(Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct DirectResponse {
    content: String,
}

#[derive(Deserialize)]
struct ChoicesChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct DirectChunk {
    delta: TextDelta,
}

#[derive(Deserialize)]
struct TextDelta {
    text: Option<String>,
}

// ─────────────────────────────────────────────
// Extraction
// ─────────────────────────────────────────────

/// Extract the assistant's text from a full (non-streamed) response.
///
/// Fails with `MalformedResponse` when the class's field path is absent
/// or null.
pub fn extract_text(class: ProviderClass, response: &Value) -> Result<String> {
    match class {
        ProviderClass::AnthropicLike => {
            let parsed: DirectResponse = serde_json::from_value(response.clone())
                .map_err(|_| ChatError::MalformedResponse("missing content".to_string()))?;
            Ok(parsed.content)
        }
        ProviderClass::Default | ProviderClass::AzureLike => {
            let parsed: ChoicesResponse = serde_json::from_value(response.clone())
                .map_err(|_| ChatError::MalformedResponse("missing choices".to_string()))?;
            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| {
                    ChatError::MalformedResponse("missing choices[0].message.content".to_string())
                })
        }
    }
}

/// Extract the incremental text delta from a streamed chunk.
///
/// A chunk whose delta path exists but carries no text (a terminal or
/// control chunk) yields an empty string; a chunk missing the enclosing
/// path entirely is `MalformedResponse`.
pub fn extract_delta(class: ProviderClass, chunk: &Value) -> Result<String> {
    match class {
        ProviderClass::AnthropicLike => {
            let parsed: DirectChunk = serde_json::from_value(chunk.clone())
                .map_err(|_| ChatError::MalformedResponse("missing delta.text".to_string()))?;
            Ok(parsed.delta.text.unwrap_or_default())
        }
        ProviderClass::Default | ProviderClass::AzureLike => {
            let parsed: ChoicesChunk = serde_json::from_value(chunk.clone())
                .map_err(|_| ChatError::MalformedResponse("missing choices[0].delta".to_string()))?;
            Ok(parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.delta.content)
                .unwrap_or_default())
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_text_openai_shape() {
        let response = json!({
            "id": "chatcmpl-1",
            "choices": [{
                "message": { "role": "assistant", "content": "Hello there." },
                "finish_reason": "stop"
            }]
        });
        assert_eq!(
            extract_text(ProviderClass::Default, &response).unwrap(),
            "Hello there."
        );
        assert_eq!(
            extract_text(ProviderClass::AzureLike, &response).unwrap(),
            "Hello there."
        );
    }

    #[test]
    fn test_extract_text_anthropic_shape() {
        let response = json!({ "content": "Direct content field." });
        assert_eq!(
            extract_text(ProviderClass::AnthropicLike, &response).unwrap(),
            "Direct content field."
        );
    }

    #[test]
    fn test_extract_text_missing_choices() {
        let err = extract_text(ProviderClass::Default, &json!({"id": "x"})).unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_text_empty_choices() {
        let err = extract_text(ProviderClass::Default, &json!({"choices": []})).unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_text_null_content() {
        let response = json!({"choices": [{"message": {"content": null}}]});
        let err = extract_text(ProviderClass::Default, &response).unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_text_wrong_shape_for_class() {
        // An OpenAI-shaped body handed to the Anthropic extractor is malformed
        let response = json!({"choices": [{"message": {"content": "hi"}}]});
        let err = extract_text(ProviderClass::AnthropicLike, &response).unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_delta_openai_shape() {
        let chunk = json!({"choices": [{"delta": {"content": "Hel"}}]});
        assert_eq!(extract_delta(ProviderClass::Default, &chunk).unwrap(), "Hel");
    }

    #[test]
    fn test_extract_delta_anthropic_shape() {
        let chunk = json!({"delta": {"text": "lo"}});
        assert_eq!(
            extract_delta(ProviderClass::AnthropicLike, &chunk).unwrap(),
            "lo"
        );
    }

    #[test]
    fn test_extract_delta_terminal_chunk_is_empty() {
        // Final OpenAI chunk has an empty delta object
        let chunk = json!({"choices": [{"delta": {}, "finish_reason": "stop"}]});
        assert_eq!(extract_delta(ProviderClass::Default, &chunk).unwrap(), "");

        let chunk = json!({"delta": {}});
        assert_eq!(
            extract_delta(ProviderClass::AnthropicLike, &chunk).unwrap(),
            ""
        );
    }

    #[test]
    fn test_extract_delta_missing_path() {
        let err = extract_delta(ProviderClass::Default, &json!({"foo": 1})).unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));

        let err = extract_delta(ProviderClass::AnthropicLike, &json!({"foo": 1})).unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
    }
}
