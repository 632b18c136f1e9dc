//! Error types shared by the storefront crates.

use thiserror::Error;

/// Errors from the client-side key/value storage
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Reading or writing the backing medium failed
    #[error("Storage I/O failed: {0}")]
    Io(String),

    /// The backing medium holds data that cannot be decoded
    #[error("Storage data is corrupt: {0}")]
    Corrupt(String),

    /// A value could not be encoded for storage
    #[error("Storage serialization failed: {0}")]
    Serialization(String),
}

/// Errors from the storefront HTTP endpoints
///
/// Cloneable so that failures can travel inside actions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, TLS)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The server answered with a non-success status
    #[error("Server returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The response body does not match the expected schema
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A URL could not be built from the configured base
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl {
        /// The offending URL or path
        url: String,
        /// Parser message
        reason: String,
    },
}

impl ApiError {
    /// Whether the failure happened below the application protocol
    /// (no response, or a non-success status)
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::RequestFailed(_) | Self::Status { .. })
    }
}
