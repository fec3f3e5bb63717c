//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Sub-modules with their own failure
//! taxonomy ([`organize`](crate::organize), [`resolve`](crate::resolve))
//! raise into these kinds at their public boundary.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The directory tree could not be walked. Fatal for a run.
    #[display("could not discover files")]
    Discovery,
    /// The shared HTTP session could not be established. Fatal for a run.
    #[display("could not establish lookup session")]
    Session,
    /// A single file could not be organized.
    #[display("could not organize file")]
    Organize,
    /// The event stream ended without reporting completion.
    #[display("run ended before completing")]
    Incomplete,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            _ => false,
        }
    }
}
