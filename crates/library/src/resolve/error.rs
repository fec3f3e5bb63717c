//! Error types for the [`resolve`](super) module.
//!
//! These never escape a [`LabelResolver`](super::LabelResolver); they exist
//! so that the reason for a fallback label can be logged with its full
//! error tree.

use derive_more::{Display, Error};

/// A resolve error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for resolve operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The HTTP client could not be configured (bad URL, header or TLS setup).
    #[display("invalid lookup session configuration")]
    Session,
    /// The request could not be sent or timed out.
    #[display("request failed")]
    Request,
    /// The service answered with something other than `200 OK`.
    #[display("unexpected status code: {_0}")]
    Status(#[error(not(source))] u16),
    /// The response body could not be read.
    #[display("could not read response body")]
    Body,
    /// The page was fetched but carries no label.
    #[display("no label found on page")]
    NotFound,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request | Self::Body => true,
            Self::Status(status) => *status == 429 || *status >= 500,
            Self::Session | Self::NotFound => false,
        }
    }
}
