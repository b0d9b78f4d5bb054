//! Error types for the Harvest SDK.

use serde::Deserialize;

/// Result type for SDK operations.
pub type HarvestResult<T> = Result<T, HarvestError>;

/// Error types that can occur when talking to the Harvest API.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success response.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required credential is not set.
    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// Response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The server broke the paging contract.
    #[error("Pagination error: {0}")]
    Pagination(String),
}

impl HarvestError {
    /// HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message reported by the upstream service, if the failure came from a response.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Short machine-readable code for transport level failures.
    pub fn transport_code(&self) -> Option<&'static str> {
        let Self::Http(e) = self else {
            return None;
        };
        let code = if e.is_timeout() {
            "timeout"
        } else if e.is_connect() {
            "connect"
        } else if e.is_redirect() {
            "redirect"
        } else if e.is_decode() {
            "decode"
        } else if e.is_body() {
            "body"
        } else if e.is_builder() {
            "builder"
        } else if e.is_request() {
            "request"
        } else {
            "unknown"
        };
        Some(code)
    }

    /// Check if this error may succeed on a second attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Create an API error from a status code and response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(ErrorResponse::into_message)
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    default_reason(status).to_string()
                } else {
                    trimmed.to_string()
                }
            });

        Self::Api { status, message }
    }
}

fn default_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
}

/// Error body returned by the Harvest API.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorResponse {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.message)
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}
