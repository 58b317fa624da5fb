//! Error types for bulk-http

/// Result type for bulk-http operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the remote
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
