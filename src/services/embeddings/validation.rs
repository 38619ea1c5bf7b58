//! Validation functions for embedding requests.

use crate::error::{GeminiError, GeminiResult, RequestError};
use crate::types::{EmbedContentRequest, TaskType};

/// Largest output dimensionality the embedding models accept.
pub const MAX_OUTPUT_DIMENSIONALITY: u32 = 3072;

/// Maximum batch size for batch embed requests.
pub const MAX_BATCH_SIZE: usize = 100;

/// Validate an embed content request.
///
/// Every problem found is reported in one `ValidationError`.
pub fn validate_embed_request(request: &EmbedContentRequest) -> GeminiResult<()> {
    let mut details = Vec::new();

    if request.content.parts.is_empty() {
        details.push("content must have at least one part".to_string());
    }

    for (idx, part) in request.content.parts.iter().enumerate() {
        if let Some(shape) = part.shape() {
            details.push(format!(
                "content.parts[{}]: embeddings only accept text parts, got '{}'",
                idx, shape
            ));
        } else if part.text.as_deref().map_or(true, str::is_empty) {
            details.push(format!("content.parts[{}].text cannot be empty", idx));
        }
    }

    if let Some(dim) = request.output_dimensionality {
        if !(1..=MAX_OUTPUT_DIMENSIONALITY).contains(&dim) {
            details.push(format!(
                "output_dimensionality must be between 1 and {}, got {}",
                MAX_OUTPUT_DIMENSIONALITY, dim
            ));
        }
    }

    if request.title.is_some() && request.task_type != Some(TaskType::RetrievalDocument) {
        details.push("title can only be provided for RETRIEVAL_DOCUMENT task type".to_string());
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(invalid(format!("Invalid embed content request: {}", details.join("; "))))
    }
}

/// Validate batch size for batch embed requests.
pub fn validate_batch_size(batch_size: usize) -> GeminiResult<()> {
    if batch_size == 0 {
        return Err(invalid("batch must contain at least one request"));
    }

    if batch_size > MAX_BATCH_SIZE {
        return Err(invalid(format!(
            "batch size {} exceeds maximum of {}",
            batch_size, MAX_BATCH_SIZE
        )));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> GeminiError {
    GeminiError::Request(RequestError::ValidationError {
        message: message.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, Part};
    use serde_json::{json, Map};

    fn request(parts: Vec<Part>) -> EmbedContentRequest {
        EmbedContentRequest {
            model: "models/text-embedding-004".to_string(),
            content: Content { role: None, parts },
            task_type: None,
            title: None,
            output_dimensionality: None,
        }
    }

    fn message(result: GeminiResult<()>) -> String {
        match result {
            Err(GeminiError::Request(RequestError::ValidationError { message })) => message,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_embed_request_valid() {
        assert!(validate_embed_request(&request(vec![Part::text("Hello")])).is_ok());
    }

    #[test]
    fn test_validate_embed_request_empty_parts() {
        let error = message(validate_embed_request(&request(vec![])));
        assert!(error.contains("at least one part"));
    }

    #[test]
    fn test_validate_embed_request_empty_text() {
        let error = message(validate_embed_request(&request(vec![Part::text("")])));
        assert!(error.contains("content.parts[0].text"));
    }

    #[test]
    fn test_validate_embed_request_rejects_non_text_part() {
        let mut other = Map::new();
        other.insert("inlineData".to_string(), json!({"mimeType": "image/png", "data": ""}));
        let part = Part { text: None, other };

        let error = message(validate_embed_request(&request(vec![part])));
        assert!(error.contains("'inlineData'"));
    }

    #[test]
    fn test_validate_output_dimensionality() {
        let mut valid = request(vec![Part::text("Hello")]);
        valid.output_dimensionality = Some(768);
        assert!(validate_embed_request(&valid).is_ok());

        let mut zero = valid.clone();
        zero.output_dimensionality = Some(0);
        assert!(validate_embed_request(&zero).is_err());

        let mut too_large = valid;
        too_large.output_dimensionality = Some(MAX_OUTPUT_DIMENSIONALITY + 1);
        assert!(validate_embed_request(&too_large).is_err());
    }

    #[test]
    fn test_validate_title_requires_retrieval_document() {
        let mut with_title = request(vec![Part::text("Hello")]);
        with_title.title = Some("Doc".to_string());
        with_title.task_type = Some(TaskType::RetrievalQuery);
        assert!(message(validate_embed_request(&with_title)).contains("RETRIEVAL_DOCUMENT"));

        with_title.task_type = Some(TaskType::RetrievalDocument);
        assert!(validate_embed_request(&with_title).is_ok());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut bad = request(vec![Part::text("")]);
        bad.output_dimensionality = Some(0);
        bad.title = Some("Doc".to_string());

        let error = message(validate_embed_request(&bad));
        assert_eq!(error.matches("; ").count(), 2);
    }

    #[test]
    fn test_validate_batch_size() {
        assert!(validate_batch_size(1).is_ok());
        assert!(validate_batch_size(MAX_BATCH_SIZE).is_ok());
        assert!(validate_batch_size(0).is_err());
        assert!(validate_batch_size(MAX_BATCH_SIZE + 1).is_err());
    }
}
