//! Error types for access decisions
//!
//! An access check itself never fails for an unknown role or a missing grant;
//! those are plain denials. Errors only come from malformed input at the
//! boundary and from loading policy configuration.

use thiserror::Error;

/// Access decision error types.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Call-time input does not have the expected shape
    #[error("Invalid input: {0}")]
    InvalidArgument(String),

    /// Policy file could not be read
    #[error("Failed to read policy file `{path}`")]
    PolicyLoad {
        /// Path of the policy file.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Policy document is not valid JSON
    #[error("Invalid policy document: {0}")]
    PolicyParse(#[from] serde_json::Error),

    /// Missing required environment variable
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Result type for access decision operations.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Create an [`AccessError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        AccessError::InvalidArgument(message.into())
    }

    /// Check if the caller can fix this error at the call site.
    ///
    /// Malformed arguments are caller bugs; the remaining variants come from
    /// the environment the process runs in.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, AccessError::InvalidArgument(_))
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AccessError::PolicyLoad { .. } => "POLICY_LOAD_ERROR",
            AccessError::PolicyParse(_) => "POLICY_PARSE_ERROR",
            AccessError::MissingEnvVar(_) => "CONFIG_ERROR",
        }
    }
}
