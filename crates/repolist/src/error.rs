//! Error types for repository listing

use thiserror::Error;

/// Boxed underlying cause of a failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Repository listing errors
#[derive(Debug, Error)]
pub enum ListError {
    // ============ Input Errors ============
    #[error("Invalid repository filter '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid registry address '{registry}': {reason}")]
    InvalidRegistry { registry: String, reason: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ============ Authentication Errors ============
    #[error("Credentials error: {message}")]
    Credentials { message: String },

    #[error("Token exchange with {url} failed: {message}")]
    TokenExchange { url: String, message: String },

    // ============ Listing Errors ============
    #[error("Failed to retrieve repository list from {registry}: {message}")]
    Retrieval {
        registry: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    // ============ IO Errors ============
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for listing operations
pub type Result<T> = std::result::Result<T, ListError>;

impl ListError {
    /// Listing `registry` failed for a reason described by `message`
    pub(crate) fn retrieval(registry: &str, message: impl std::fmt::Display) -> Self {
        ListError::Retrieval {
            registry: registry.to_string(),
            message: message.to_string(),
            source: None,
        }
    }

    /// Listing `registry` failed because of `cause`, which stays reachable
    /// through [`std::error::Error::source`]
    pub(crate) fn retrieval_caused(
        registry: &str,
        context: &str,
        cause: impl Into<BoxError>,
    ) -> Self {
        let cause = cause.into();
        let message = if context.is_empty() {
            cause.to_string()
        } else {
            format!("{}: {}", context, cause)
        };
        ListError::Retrieval {
            registry: registry.to_string(),
            message,
            source: Some(cause),
        }
    }

    /// Wrap a failure of a token or login call against `url`
    pub(crate) fn token_exchange(url: &str, e: impl std::fmt::Display) -> Self {
        ListError::TokenExchange {
            url: url.to_string(),
            message: e.to_string(),
        }
    }

    /// Whether the error came from authenticating rather than listing
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ListError::Credentials { .. } | ListError::TokenExchange { .. }
        )
    }
}

impl From<serde_yaml::Error> for ListError {
    fn from(e: serde_yaml::Error) -> Self {
        ListError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for ListError {
    fn from(e: serde_json::Error) -> Self {
        ListError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_stage() {
        let err = ListError::retrieval("registry.example.com", "connection refused");
        assert_eq!(
            err.to_string(),
            "Failed to retrieve repository list from registry.example.com: connection refused"
        );

        assert!(std::error::Error::source(&err).is_none());

        let err = ListError::token_exchange("https://registry.example.com/token", "401");
        assert!(err.to_string().contains("https://registry.example.com/token"));
        assert!(err.is_auth());
    }

    #[test]
    fn test_retrieval_keeps_cause() {
        let cause = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err =
            ListError::retrieval_caused("registry.example.com", "invalid catalog response", cause);

        assert!(err.to_string().contains("invalid catalog response: expected value"));
        let source = std::error::Error::source(&err).expect("cause should be kept");
        assert!(source.is::<serde_json::Error>());
    }

    #[test]
    fn test_invalid_pattern_keeps_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ListError::InvalidPattern {
            pattern: "(".to_string(),
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_auth());
    }
}
