//! Error types for bulk-core

/// Result type for bulk-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bulk-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No metadata file in the directory
    #[error("Not a restbulk checkout: {path} not found")]
    NotACheckout { path: String },

    /// Metadata already exists where a new checkout was requested
    #[error("Checkout already initialized at {path}")]
    AlreadyInitialized { path: String },

    /// The listing request did not succeed
    #[error("Listing request to {url} returned status {status}")]
    ListRequest { url: String, status: u16 },

    /// The (filtered) listing body is not an array
    #[error("list response is not a list")]
    NotAList,

    /// A listing entry does not resolve to a (url, version) pair
    #[error("Listing entry {index} is invalid: {reason}")]
    InvalidEntry { index: usize, reason: String },

    /// Two listing entries map to the same local path
    #[error("Listing entries {first} and {second} both map to {path}")]
    DuplicateEntry {
        path: String,
        first: String,
        second: String,
    },

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// A per-resource request returned an error status
    #[error("{method} {url} returned status {status}")]
    HttpStatus {
        method: String,
        url: String,
        status: u16,
    },

    #[error("No tracked file at {path}")]
    UnknownFile { path: String },

    #[error("No cached copy of {path}")]
    NoCachedCopy { path: String },

    #[error("Invalid match expression: {0}")]
    InvalidMatch(String),

    /// Filesystem error from bulk-fs
    #[error(transparent)]
    Fs(#[from] bulk_fs::Error),

    /// Transport error from bulk-http
    #[error(transparent)]
    Http(#[from] bulk_http::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
