//! Endpoint paths for the Gemini API.

use crate::config::StreamFormat;

/// Base path for models endpoints.
pub const MODELS: &str = "/models";

/// Constructs a path for the generateContent endpoint.
///
/// # Example
///
/// ```
/// use integrations_gemini_chat::transport::endpoints;
///
/// let path = endpoints::generate_content("gemini-2.0-flash");
/// assert_eq!(path, "/models/gemini-2.0-flash:generateContent");
/// ```
pub fn generate_content(model: &str) -> String {
    format!("{}/{}:generateContent", MODELS, model)
}

/// Constructs a path for the streamGenerateContent endpoint.
///
/// Without `alt=sse` the endpoint answers with one JSON array whose
/// elements arrive incrementally.
pub fn stream_generate_content(model: &str) -> String {
    format!("{}/{}:streamGenerateContent", MODELS, model)
}

/// Constructs a path for the embedContent endpoint.
///
/// # Example
///
/// ```
/// use integrations_gemini_chat::transport::endpoints;
///
/// let path = endpoints::embed_content("models/text-embedding-004");
/// assert_eq!(path, "/models/text-embedding-004:embedContent");
/// ```
pub fn embed_content(model: &str) -> String {
    format!("{}/{}:embedContent", MODELS, model_id(model))
}

/// Constructs a path for the batchEmbedContents endpoint.
pub fn batch_embed_contents(model: &str) -> String {
    format!("{}/{}:batchEmbedContents", MODELS, model_id(model))
}

/// The `models/{model}` resource name the embedding request bodies carry.
pub fn model_resource(model: &str) -> String {
    format!("models/{}", model_id(model))
}

fn model_id(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

/// Query parameters selecting the streaming wire format.
pub fn stream_query(format: StreamFormat) -> Vec<(&'static str, &'static str)> {
    match format {
        StreamFormat::JsonArray => Vec::new(),
        StreamFormat::ServerSentEvents => vec![("alt", "sse")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_content_path() {
        assert_eq!(
            generate_content("gemini-pro"),
            "/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_stream_generate_content_path() {
        assert_eq!(
            stream_generate_content("gemini-pro"),
            "/models/gemini-pro:streamGenerateContent"
        );
    }

    #[test]
    fn test_embedding_paths_accept_both_model_spellings() {
        assert_eq!(
            batch_embed_contents("text-embedding-004"),
            "/models/text-embedding-004:batchEmbedContents"
        );
        assert_eq!(
            batch_embed_contents("models/text-embedding-004"),
            "/models/text-embedding-004:batchEmbedContents"
        );
        assert_eq!(model_resource("text-embedding-004"), "models/text-embedding-004");
        assert_eq!(model_resource("models/text-embedding-004"), "models/text-embedding-004");
    }

    #[test]
    fn test_stream_query() {
        assert!(stream_query(StreamFormat::JsonArray).is_empty());
        assert_eq!(stream_query(StreamFormat::ServerSentEvents), vec![("alt", "sse")]);
    }
}
