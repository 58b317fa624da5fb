//! Error types for bulk-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from bulk-core
    #[error(transparent)]
    Core(#[from] bulk_core::Error),

    /// Error from bulk-fs
    #[error(transparent)]
    Fs(#[from] bulk_fs::Error),

    /// Error from bulk-http
    #[error(transparent)]
    Http(#[from] bulk_http::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Some files did not synchronize
    #[error("{failed} file(s) failed to synchronize")]
    Incomplete { failed: usize },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
