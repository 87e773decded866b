//! Error types for the gallery core.
//!
//! Every failure is local to the operation that produced it:
//!
//! - [`FetchError`] - listing requests (cancellation is a variant, not a failure)
//! - [`RouteError`] - addresses that do not map to a listing source
//! - [`StorageError`] - bookmark store writes

use thiserror::Error;

/// Errors produced while fetching a listing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request was superseded and aborted.
    #[error("request aborted")]
    Aborted,
    /// Browser window not available.
    #[error("browser window not available")]
    NoWindow,
    /// Failed to create the HTTP request.
    #[error("failed to create request")]
    RequestCreationFailed,
    /// Network request failed.
    #[error("network error: {0}")]
    NetworkError(String),
    /// Non-success HTTP status.
    #[error("{status} {text}")]
    HttpError { status: u16, text: String },
    /// Response body was not a listing.
    #[error("json parse error: {0}")]
    JsonParseError(String),
    /// The address does not map to a listing source.
    #[error("{0}")]
    Unsupported(String),
}

impl FetchError {
    /// Whether this error only means the request was superseded.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Addresses that cannot be resolved to a listing source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("unsupported resource url: {0}")]
    UnsupportedAddress(String),
    #[error("unknown tag: {0}")]
    UnknownTag(String),
    #[error("unknown bookmark item: {tag}/{num}")]
    UnknownItem { tag: String, num: String },
}

impl From<RouteError> for FetchError {
    fn from(err: RouteError) -> Self {
        Self::Unsupported(err.to_string())
    }
}

/// Bookmark store write failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backing storage is not available.
    #[error("storage not available")]
    Unavailable,
    /// The backing storage rejected a write.
    #[error("failed to write to storage: {0}")]
    WriteFailed(String),
}
