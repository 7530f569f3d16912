//! REST client error types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Message suitable for an inline banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout { .. } => {
                "The server did not respond in time. Please try again.".to_string()
            }
            Self::Http { status, message } => format!("Server error ({status}): {message}"),
            Self::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            Self::Decode(_) => "The server sent an unexpected response.".to_string(),
            Self::InvalidUrl(url) => format!("Invalid request address: {url}"),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Metric label for the failure kind.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Http { .. } => "http",
            Self::Network(_) => "network",
            Self::Decode(_) => "decode",
            Self::InvalidUrl(_) => "invalid_url",
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let timeout = ApiError::Timeout { timeout_ms: 15000 };
        assert!(timeout.is_timeout());
        assert!(timeout.user_message().contains("did not respond"));

        let http = ApiError::Http {
            status: 404,
            message: "alert not found".to_string(),
        };
        assert_eq!(http.status(), Some(404));
        assert_eq!(http.user_message(), "Server error (404): alert not found");
        assert!(!http.is_timeout());
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(ApiError::Network("x".into()).outcome(), "network");
        assert_eq!(ApiError::Decode("x".into()).outcome(), "decode");
    }
}
