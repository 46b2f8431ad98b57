use serde::Deserialize;

/// Structured error body returned by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerError {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Everything a request can fail with. `Clone` so a cached outcome can be
/// handed to every caller sharing the same in-flight request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Caught before any network call is made.
    #[error("{0}")]
    Validation(String),

    /// Client-side deadline exceeded; the transport was aborted.
    #[error("Request timed out")]
    Timeout,

    /// Transport or (de)serialization failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `message` is already user-facing.
    #[error("{message}")]
    Status {
        code: u16,
        message: String,
        server: Option<ServerError>,
    },
}

impl ApiError {
    pub fn status(code: u16, body: &str) -> Self {
        let server: Option<ServerError> = serde_json::from_str(body).ok();
        let message = status_message(code, server.as_ref());
        ApiError::Status { code, message, server }
    }
}

/// Map an HTTP status code to a user-facing message. 429 is fixed regardless
/// of what the server said; 400 and unmapped codes prefer the server message.
fn status_message(code: u16, server: Option<&ServerError>) -> String {
    let server_message = server.map(|e| e.message.as_str()).filter(|m| !m.is_empty());
    match code {
        400 => server_message
            .unwrap_or("Invalid request. Please check your input.")
            .to_string(),
        401 => "Authentication required. Please log in.".to_string(),
        403 => "You do not have permission to perform this action.".to_string(),
        404 => "The requested resource was not found.".to_string(),
        429 => "Too many requests. Please wait a moment and try again.".to_string(),
        500 => "Server error. Please try again later.".to_string(),
        502 | 503 | 504 => "Service temporarily unavailable. Please try again later.".to_string(),
        _ => server_message
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed ({code})")),
    }
}
