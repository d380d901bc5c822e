//! API error types for the Frappe client.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to a Frappe site.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication failed - invalid API key or secret.
    #[error("Authentication failed: check your API key and secret")]
    Unauthorized,

    /// Permission denied - the API user lacks access to the doctype.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Doctype or method not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Rate limited by the site.
    #[error("Rate limited: please wait before retrying")]
    RateLimited,

    /// The site raised an exception.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid site URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Keyring error when storing or reading the API secret.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// The response body did not have the expected shape.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// The parts of a Frappe error body worth showing.
#[derive(Debug, Default, Deserialize)]
struct FrappeErrorBody {
    #[serde(default)]
    exc_type: Option<String>,
    #[serde(default)]
    exception: Option<String>,
    /// A JSON-encoded list of JSON-encoded `{"message": ...}` objects.
    #[serde(default, rename = "_server_messages")]
    server_messages: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerMessage {
    message: String,
}

/// Extract a readable message from a Frappe error body.
///
/// Prefers the user-facing `_server_messages`, then `exception`, then
/// `exc_type`. Returns `None` for bodies that are not Frappe errors.
pub fn frappe_message(body: &str) -> Option<String> {
    let parsed: FrappeErrorBody = serde_json::from_str(body).ok()?;

    if let Some(raw) = parsed.server_messages.as_deref() {
        let messages: Vec<String> = serde_json::from_str::<Vec<String>>(raw)
            .unwrap_or_default()
            .iter()
            .filter_map(|m| serde_json::from_str::<ServerMessage>(m).ok())
            .map(|m| m.message)
            .filter(|m| !m.trim().is_empty())
            .collect();
        if !messages.is_empty() {
            return Some(messages.join("; "));
        }
    }

    parsed
        .exception
        .map(|e| match e.split_once(": ") {
            Some((_, msg)) if !msg.trim().is_empty() => msg.trim().to_string(),
            _ => e,
        })
        .or(parsed.exc_type)
}

impl ApiError {
    /// Create an error from an HTTP status code and the response body.
    pub fn from_status(status: reqwest::StatusCode, context: &str, body: &str) -> Self {
        let detail = frappe_message(body).unwrap_or_else(|| context.to_string());
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(detail),
            404 => ApiError::NotFound(context.to_string()),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(format!("HTTP {}: {}", status.as_u16(), detail)),
            _ => ApiError::ServerError(format!("Unexpected HTTP {}: {}", status.as_u16(), detail)),
        }
    }

    /// Whether repeating the request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::RateLimited => true,
            ApiError::ServerError(msg) => msg.starts_with("HTTP 5"),
            ApiError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_from_status_401() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "test", "");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_error_from_status_403_uses_server_message() {
        let body = r#"{"exc_type":"PermissionError","_server_messages":"[\"{\\\"message\\\": \\\"Not permitted\\\"}\"]"}"#;
        let err = ApiError::from_status(StatusCode::FORBIDDEN, "Purchase Order", body);
        match err {
            ApiError::Forbidden(msg) => assert_eq!(msg, "Not permitted"),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_error_from_status_404() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "doctype Widgets", "");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "doctype Widgets"),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_error_from_status_429_is_retryable() {
        let err = ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "test", "");
        assert!(matches!(err, ApiError::RateLimited));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_from_status_500_uses_exception() {
        let body = r#"{"exception":"frappe.exceptions.ValidationError: Invalid filter"}"#;
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "list", body);
        match &err {
            ApiError::ServerError(msg) => assert_eq!(msg, "HTTP 500: Invalid filter"),
            other => panic!("expected ServerError, got {:?}", other),
        }
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_from_status_417_is_not_retryable() {
        let body = r#"{"exc_type":"ValidationError"}"#;
        let err = ApiError::from_status(StatusCode::EXPECTATION_FAILED, "list", body);
        assert!(matches!(&err, ApiError::ServerError(m) if m.contains("ValidationError")));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_frappe_message_ignores_non_json() {
        assert_eq!(frappe_message("<html>Bad gateway</html>"), None);
    }
}
