//! Error types for the Google embedder.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for Google embedder operations.
pub type Result<T> = std::result::Result<T, GoogleEmbedderError>;

/// Errors raised while talking to the Generative Language API.
#[derive(Error, Debug)]
pub enum GoogleEmbedderError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// API key rejected (HTTP 401/403)
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error message
        message: String,
    },

    /// Quota or rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Error message
        message: String,
    },

    /// Request rejected as malformed (HTTP 400)
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Error message
        message: String,
    },

    /// Any other non-success status
    #[error("Server error: {status_code} - {message}")]
    Server {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Connection failure
    #[error("Network error: {message}")]
    Network {
        /// Error message
        message: String,
    },

    /// Request timeout
    #[error("Request timeout after {seconds} seconds")]
    Timeout {
        /// Timeout duration in seconds
        seconds: u64,
    },

    /// Response body could not be decoded or did not match the request
    #[error("Unexpected response: {message}")]
    UnexpectedResponse {
        /// Error message
        message: String,
    },
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GoogleEmbedderError {
    /// Create a configuration error.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a network error.
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an unexpected response error.
    pub fn unexpected<S: Into<String>>(message: S) -> Self {
        Self::UnexpectedResponse {
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP response.
    ///
    /// The message is taken from the JSON error envelope when present and
    /// falls back to the raw body.
    pub fn from_status(status_code: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => match parsed.error.status {
                Some(status) => format!("{status}: {}", parsed.error.message),
                None => parsed.error.message,
            },
            Err(_) if body.trim().is_empty() => format!("HTTP {status_code}"),
            Err(_) => body.trim().to_string(),
        };

        match status_code {
            400 => Self::InvalidInput { message },
            401 | 403 => Self::Authentication { message },
            429 => Self::RateLimit { message },
            _ => Self::Server {
                status_code,
                message,
            },
        }
    }

    /// Build from a transport error, given the configured timeout.
    pub fn from_reqwest(error: &reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                seconds: timeout.as_secs(),
            }
        } else if error.is_decode() {
            Self::unexpected(error.to_string())
        } else {
            Self::network(error.to_string())
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::RateLimit { .. } => true,
            Self::Server { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Base delay before retrying, for retryable errors.
    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { .. } => Some(Duration::from_secs(10)),
            _ if self.is_retryable() => Some(Duration::from_secs(1)),
            _ => None,
        }
    }
}

impl From<GoogleEmbedderError> for atlasrag_core::AtlasRagError {
    fn from(error: GoogleEmbedderError) -> Self {
        match error {
            GoogleEmbedderError::Configuration { message } => Self::configuration(message),
            GoogleEmbedderError::Authentication { message } => {
                tracing::error!("Google API rejected the credentials: {message}");
                Self::Authentication
            }
            GoogleEmbedderError::RateLimit { message } => {
                tracing::warn!("Google API rate limit: {message}");
                Self::RateLimit
            }
            GoogleEmbedderError::InvalidInput { message } => Self::validation(message),
            GoogleEmbedderError::Timeout { seconds } => {
                Self::timeout(format!("embedding request after {seconds} seconds"))
            }
            other @ (GoogleEmbedderError::Server { .. }
            | GoogleEmbedderError::Network { .. }
            | GoogleEmbedderError::UnexpectedResponse { .. }) => Self::embedding(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlasrag_core::AtlasRagError;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            GoogleEmbedderError::from_status(400, ""),
            GoogleEmbedderError::InvalidInput { .. }
        ));
        assert!(matches!(
            GoogleEmbedderError::from_status(401, ""),
            GoogleEmbedderError::Authentication { .. }
        ));
        assert!(matches!(
            GoogleEmbedderError::from_status(403, ""),
            GoogleEmbedderError::Authentication { .. }
        ));
        assert!(matches!(
            GoogleEmbedderError::from_status(429, ""),
            GoogleEmbedderError::RateLimit { .. }
        ));
        assert!(matches!(
            GoogleEmbedderError::from_status(503, ""),
            GoogleEmbedderError::Server {
                status_code: 503,
                ..
            }
        ));
    }

    #[test]
    fn test_message_from_error_envelope() {
        let body =
            r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        let error = GoogleEmbedderError::from_status(400, body);
        assert_eq!(
            error.to_string(),
            "Invalid input: INVALID_ARGUMENT: API key not valid."
        );
    }

    #[test]
    fn test_retryable() {
        assert!(GoogleEmbedderError::from_status(500, "").is_retryable());
        assert!(GoogleEmbedderError::from_status(429, "").is_retryable());
        assert!(!GoogleEmbedderError::from_status(404, "").is_retryable());
        assert!(!GoogleEmbedderError::from_status(401, "").is_retryable());
        assert_eq!(
            GoogleEmbedderError::from_status(429, "").retry_delay(),
            Some(Duration::from_secs(10))
        );
        assert_eq!(GoogleEmbedderError::from_status(400, "").retry_delay(), None);
    }

    #[test]
    fn test_into_core_error() {
        let core: AtlasRagError = GoogleEmbedderError::from_status(401, "").into();
        assert!(matches!(core, AtlasRagError::Authentication));

        let core: AtlasRagError = GoogleEmbedderError::from_status(400, "bad").into();
        assert!(matches!(core, AtlasRagError::Validation { .. }));

        let core: AtlasRagError = GoogleEmbedderError::configuration("x").into();
        assert!(core.is_configuration());

        let core: AtlasRagError = GoogleEmbedderError::from_status(500, "boom").into();
        assert!(matches!(core, AtlasRagError::Embedding { .. }));
    }
}
