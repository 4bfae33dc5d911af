//! Error types for atlasrag.
//!
//! Every layer of the workspace reports failures through [`AtlasRagError`].
//! Integration crates keep their own richer error enums and convert into
//! this one at the trait boundary.

use thiserror::Error;

/// Core error type shared by the whole workspace.
#[derive(Error, Debug)]
pub enum AtlasRagError {
    /// I/O related errors (reading a secrets file, sockets, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Embedding generation errors
    #[error("Embedding error: {message}")]
    Embedding {
        /// Detailed error message
        message: String,
    },

    /// Vector store operation errors
    #[error("Vector store error: {message}")]
    VectorStore {
        /// Detailed error message
        message: String,
    },

    /// Missing or invalid configuration
    #[error("Configuration error: {message}")]
    Configuration {
        /// Detailed error message
        message: String,
    },

    /// Input validation errors
    #[error("Validation error: {message}")]
    Validation {
        /// Detailed error message
        message: String,
    },

    /// Resource not found errors
    #[error("Not found: {resource}")]
    NotFound {
        /// Name of the missing resource
        resource: String,
    },

    /// Operation timeout errors
    #[error("Timeout: {operation}")]
    Timeout {
        /// Name of the operation that timed out
        operation: String,
    },

    /// Rate limiting errors
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Authentication failures
    #[error("Authentication failed")]
    Authentication,

    /// Internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Detailed error message
        message: String,
    },

    /// Generic errors from external dependencies
    #[error("External error: {source}")]
    External {
        /// The underlying error
        #[source]
        source: anyhow::Error,
    },
}

impl AtlasRagError {
    /// Create a new embedding error with a message.
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a new vector store error with a message.
    pub fn vector_store<S: Into<String>>(message: S) -> Self {
        Self::VectorStore {
            message: message.into(),
        }
    }

    /// Create a new configuration error with a message.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new validation error with a message.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not found error with a resource name.
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a new timeout error with an operation name.
    pub fn timeout<S: Into<String>>(operation: S) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create a new internal error with a message.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new external error from any error that implements `Into<anyhow::Error>`.
    pub fn external<E: Into<anyhow::Error>>(error: E) -> Self {
        Self::External {
            source: error.into(),
        }
    }

    /// Check if this error is retryable.
    ///
    /// Returns `true` for transient errors that might succeed on retry,
    /// such as network timeouts or rate limits.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::RateLimit | Self::Io(_))
    }

    /// Check if this error was caused by the caller (bad input or configuration).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::Configuration { .. }
                | Self::NotFound { .. }
                | Self::Authentication
        )
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl From<anyhow::Error> for AtlasRagError {
    fn from(error: anyhow::Error) -> Self {
        Self::External { source: error }
    }
}

impl From<toml::de::Error> for AtlasRagError {
    fn from(error: toml::de::Error) -> Self {
        Self::configuration(format!("Invalid secrets file: {error}"))
    }
}

/// Result type alias used throughout atlasrag.
pub type Result<T> = std::result::Result<T, AtlasRagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = AtlasRagError::embedding("Failed to generate embedding");
        assert!(matches!(err, AtlasRagError::Embedding { .. }));
        assert_eq!(
            err.to_string(),
            "Embedding error: Failed to generate embedding"
        );
    }

    #[test]
    fn test_error_retryable() {
        assert!(AtlasRagError::timeout("network").is_retryable());
        assert!(AtlasRagError::RateLimit.is_retryable());
        assert!(!AtlasRagError::validation("invalid input").is_retryable());
    }

    #[test]
    fn test_error_client_error() {
        assert!(AtlasRagError::validation("invalid").is_client_error());
        assert!(AtlasRagError::configuration("MONGO_URI").is_client_error());
        assert!(AtlasRagError::Authentication.is_client_error());
        assert!(!AtlasRagError::timeout("network").is_client_error());
    }

    #[test]
    fn test_toml_error_is_configuration() {
        let parse_error = toml::from_str::<toml::Table>("= broken").unwrap_err();
        let err = AtlasRagError::from(parse_error);
        assert!(err.is_configuration());
    }
}
