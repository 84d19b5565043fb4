//! Model client error types.

/// Errors from building a client or calling the model.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{0}")]
    Auth(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Failed to build model client: {0}")]
    Build(String),
}

const AUTH_HINT: &str = "Run `pantry-recipes key set` with a valid Gemini API key.";

/// Map a non-success HTTP status and body into LlmError.
/// Uses the Gemini `error.message` when the body is a JSON error envelope.
pub fn map_http_error(status: u16, body: &str) -> LlmError {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response body".to_string()
            } else {
                trimmed.to_string()
            }
        });
    let key_invalid = error
        .and_then(|e| e.get("details"))
        .and_then(|d| d.as_array())
        .is_some_and(|details| {
            details
                .iter()
                .any(|d| d.get("reason").and_then(|r| r.as_str()) == Some("API_KEY_INVALID"))
        });

    if status == 401 || status == 403 || key_invalid {
        return LlmError::Auth(format!(
            "API error ({}): {}. {}",
            status, message, AUTH_HINT
        ));
    }
    LlmError::Api { status, message }
}
