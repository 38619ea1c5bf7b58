//! Builds generations from candidates.

use serde_json::Value;
use std::collections::HashMap;

use crate::error::{GeminiError, GeminiResult, ResponseError};
use crate::types::{AssistantMessage, Candidate, Generation, GenerationMetadata, Role};

/// Metadata key holding the candidate's role.
pub const ROLE_METADATA_KEY: &str = "role";

/// Build the generation for `slot` from one candidate.
///
/// The text is the concatenation of the candidate's text parts. A candidate
/// without content yields empty text. `metadata` is copied into the message
/// metadata together with the role, when one was reported.
///
/// # Errors
///
/// `UnsupportedRole` for a role other than `user` or `model`, and
/// `UnsupportedContentShape` for a part that carries no text (function
/// calls, inline data and the like).
pub fn build_generation(
    slot: u32,
    candidate: &Candidate,
    metadata: &HashMap<String, Value>,
) -> GeminiResult<Generation> {
    let role = candidate.content.as_ref().and_then(|c| c.role.clone());

    if let Some(Role::Other(role)) = &role {
        return Err(GeminiError::Response(ResponseError::UnsupportedRole {
            slot,
            role: role.clone(),
        }));
    }

    let mut text = String::new();
    for part in candidate.content.iter().flat_map(|c| c.parts.iter()) {
        match (&part.text, part.shape()) {
            (Some(fragment), _) => text.push_str(fragment),
            (None, Some(shape)) => {
                return Err(GeminiError::Response(ResponseError::UnsupportedContentShape {
                    slot,
                    message: format!("part of type '{}' carries no text", shape),
                }));
            }
            (None, None) => {}
        }
    }

    let mut message_metadata = metadata.clone();
    if let Some(role) = &role {
        message_metadata.insert(ROLE_METADATA_KEY.to_string(), Value::String(role.as_str().to_string()));
    }

    Ok(Generation {
        output: AssistantMessage {
            text,
            metadata: message_metadata,
        },
        metadata: GenerationMetadata {
            slot,
            finish_reason: candidate.finish_reason.clone().unwrap_or_default(),
            role,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, Part};
    use serde_json::json;

    fn candidate(json: Value) -> Candidate {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_text_parts_are_concatenated() {
        let candidate = candidate(json!({
            "content": {"role": "model", "parts": [{"text": "Hel"}, {"text": "lo"}]},
            "finishReason": "STOP"
        }));

        let generation = build_generation(0, &candidate, &HashMap::new()).unwrap();

        assert_eq!(generation.text(), "Hello");
        assert_eq!(generation.finish_reason(), "STOP");
        assert_eq!(generation.metadata.role, Some(Role::Model));
        assert_eq!(generation.output.metadata["role"], json!("model"));
    }

    #[test]
    fn test_missing_content_and_finish_reason() {
        let generation = build_generation(2, &Candidate::default(), &HashMap::new()).unwrap();

        assert_eq!(generation.text(), "");
        assert_eq!(generation.finish_reason(), "");
        assert_eq!(generation.slot(), 2);
        assert!(generation.output.metadata.is_empty());
    }

    #[test]
    fn test_caller_metadata_is_copied() {
        let mut metadata = HashMap::new();
        metadata.insert("conversation".to_string(), json!("c-1"));
        let candidate = Candidate {
            content: Some(Content::text(Role::Model, "hi")),
            ..Candidate::default()
        };

        let generation = build_generation(0, &candidate, &metadata).unwrap();

        assert_eq!(generation.output.metadata["conversation"], json!("c-1"));
        assert_eq!(generation.output.metadata["role"], json!("model"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let candidate = candidate(json!({"content": {"role": "function", "parts": [{"text": "x"}]}}));

        let err = build_generation(1, &candidate, &HashMap::new()).unwrap_err();

        assert!(matches!(
            err,
            GeminiError::Response(ResponseError::UnsupportedRole { slot: 1, ref role }) if role == "function"
        ));
    }

    #[test]
    fn test_function_call_part_is_rejected() {
        let candidate = candidate(json!({
            "content": {"role": "model", "parts": [{"functionCall": {"name": "f", "args": {}}}]}
        }));

        let err = build_generation(0, &candidate, &HashMap::new()).unwrap_err();

        assert!(matches!(
            err,
            GeminiError::Response(ResponseError::UnsupportedContentShape { slot: 0, .. })
        ));
    }

    #[test]
    fn test_empty_part_is_empty_text() {
        let candidate = Candidate {
            content: Some(Content { role: None, parts: vec![Part::default(), Part::text("a")] }),
            ..Candidate::default()
        };

        let generation = build_generation(0, &candidate, &HashMap::new()).unwrap();

        assert_eq!(generation.text(), "a");
        assert_eq!(generation.metadata.role, None);
    }
}
