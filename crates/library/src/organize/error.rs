//! Error types for the [`organize`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// An organize error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for organize operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an organize failure.
///
/// Every variant is scoped to a single file; none of them abort a run.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Creating the label folder, claiming a name or moving the file failed.
    Storage,
    /// The admission gate was closed while a file was waiting for a slot.
    Gate,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage => true,
            Self::Gate => false,
        }
    }
}
