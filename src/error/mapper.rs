//! Maps HTTP error responses from the Gemini API onto `GeminiError`.

use serde::Deserialize;
use super::categories::*;
use super::types::GeminiError;

/// Structured API error response from Gemini.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Detailed error information from API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub status: String,
}

/// Maps an HTTP status code and response body to a `GeminiError`.
///
/// The body is expected in Gemini's `{"error": {"code", "message", "status"}}`
/// shape; anything else is carried through as plain text.
pub fn map_http_status_with_body(status: u16, body: &[u8]) -> GeminiError {
    let (message, api_status) = match serde_json::from_slice::<ApiErrorResponse>(body) {
        Ok(parsed) => (parsed.error.message, parsed.error.status),
        Err(_) => (String::from_utf8_lossy(body).trim().to_string(), String::new()),
    };

    match status {
        400 => GeminiError::Request(RequestError::ValidationError { message }),

        401 => GeminiError::Authentication(AuthenticationError::InvalidApiKey),

        403 => {
            if message.to_lowercase().contains("quota") {
                GeminiError::RateLimit(RateLimitError::QuotaExceeded { retry_after: None })
            } else if api_status.eq_ignore_ascii_case("PERMISSION_DENIED") {
                GeminiError::Authentication(AuthenticationError::PermissionDenied { message })
            } else {
                GeminiError::Authentication(AuthenticationError::InvalidApiKey)
            }
        }

        404 => GeminiError::Request(RequestError::InvalidModel {
            model: extract_resource_name(&message),
        }),

        429 => GeminiError::RateLimit(RateLimitError::TooManyRequests { retry_after: None }),

        500 => GeminiError::Server(ServerError::InternalError { message }),

        503 => {
            if message.to_lowercase().contains("overload") {
                GeminiError::Server(ServerError::ModelOverloaded {
                    model: extract_resource_name(&message),
                })
            } else {
                GeminiError::Server(ServerError::ServiceUnavailable { retry_after: None })
            }
        }

        _ => GeminiError::Server(ServerError::UnexpectedStatus { status, message }),
    }
}

/// Extracts a model or resource name from an error message (simple heuristic).
fn extract_resource_name(message: &str) -> String {
    if let Some(found) = message
        .split_whitespace()
        .find(|s| s.starts_with("models/"))
    {
        return found
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '/' && c != '-' && c != '_' && c != '.')
            .to_string();
    }

    for quote in ['\'', '"'] {
        if let Some(start) = message.find(quote) {
            if let Some(end) = message[start + 1..].find(quote) {
                return message[start + 1..start + 1 + end].to_string();
            }
        }
    }

    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_http_status_401() {
        let error = map_http_status_with_body(401, b"Invalid API key");
        assert!(matches!(
            error,
            GeminiError::Authentication(AuthenticationError::InvalidApiKey)
        ));
    }

    #[test]
    fn test_map_http_status_429() {
        let error = map_http_status_with_body(429, b"Rate limit exceeded");
        assert!(matches!(
            error,
            GeminiError::RateLimit(RateLimitError::TooManyRequests { .. })
        ));
    }

    #[test]
    fn test_map_http_status_503_overloaded() {
        let error = map_http_status_with_body(503, b"Model overloaded");
        assert!(matches!(
            error,
            GeminiError::Server(ServerError::ModelOverloaded { .. })
        ));
    }

    #[test]
    fn test_map_http_status_with_body_structured() {
        let body = r#"{"error":{"code":400,"message":"Invalid parameter","status":"INVALID_ARGUMENT"}}"#;
        let error = map_http_status_with_body(400, body.as_bytes());
        match error {
            GeminiError::Request(RequestError::ValidationError { message }) => {
                assert_eq!(message, "Invalid parameter");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_http_status_403_permission_denied() {
        let body = r#"{"error":{"code":403,"message":"Caller lacks access","status":"PERMISSION_DENIED"}}"#;
        let error = map_http_status_with_body(403, body.as_bytes());
        assert!(matches!(
            error,
            GeminiError::Authentication(AuthenticationError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_map_http_status_404_model() {
        let body = r#"{"error":{"message":"models/gemini-fake is not found for API version v1beta"}}"#;
        let error = map_http_status_with_body(404, body.as_bytes());
        match error {
            GeminiError::Request(RequestError::InvalidModel { model }) => {
                assert_eq!(model, "models/gemini-fake");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_unknown_status() {
        let error = map_http_status_with_body(418, b"teapot");
        assert!(matches!(
            error,
            GeminiError::Server(ServerError::UnexpectedStatus { status: 418, .. })
        ));
    }

    #[test]
    fn test_extract_resource_name_with_quotes() {
        let name = extract_resource_name("Model 'gemini-pro' not found");
        assert_eq!(name, "gemini-pro");
    }
}
