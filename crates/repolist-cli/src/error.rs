//! CLI error types with exit code handling
//!
//! Maps library errors to diagnostics and exit codes.

use miette::Diagnostic;
use repolist::ListError;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Bad filter, registry address or flag combination
    #[error("{message}")]
    #[diagnostic(code(repolist::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Config file could not be used
    #[error("Configuration error: {message}")]
    #[diagnostic(code(repolist::cli::config))]
    Config { message: String },

    /// Credentials missing or rejected
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(repolist::cli::auth),
        help("Check the username and password, or the Docker config entry for this registry")
    )]
    Auth { message: String },

    /// Registry could not be listed
    #[error("{message}")]
    #[diagnostic(code(repolist::cli::network))]
    Network { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(repolist::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(repolist::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Auth { .. } => exit_codes::NO_PERMISSION,
            CliError::Network { .. } => exit_codes::UNAVAILABLE,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: None,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<ListError> for CliError {
    fn from(err: ListError) -> Self {
        let message = err.to_string();
        match err {
            ListError::InvalidPattern { .. } => CliError::Usage {
                message,
                help: Some("Filters are regular expressions matched against whole repository names".to_string()),
            },
            ListError::InvalidRegistry { .. } => CliError::Usage {
                message,
                help: Some("Use host, host:port, or either with an http:// or https:// prefix".to_string()),
            },
            ListError::InvalidConfig { .. } | ListError::Serialization(_) => {
                CliError::Config { message }
            }
            ListError::Credentials { .. } | ListError::TokenExchange { .. } => {
                CliError::Auth { message }
            }
            ListError::Retrieval { .. } => CliError::Network { message },
            ListError::Io(_) => CliError::Io { message },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
