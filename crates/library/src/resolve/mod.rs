//! Code → label resolution.
//!
//! A [`LabelResolver`] never fails: whatever goes wrong during a lookup is
//! logged and turned into the [fallback label](Label::fallback). Failures are
//! only interesting to the person reading the logs, never to the pipeline.
//!
//! [`HttpResolver`] is the real implementation, fetching `{base_url}/{code}`
//! and extracting the label from the returned page.

pub mod error;
mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::http::{HttpResolver, HttpSettings};
#[cfg(any(test, feature = "mock"))]
pub use self::mock::{Call, MockResolver};

use crate::code::Code;
use async_trait::async_trait;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

pub type ResolverHandle = Arc<dyn LabelResolver>;

/// Maps a lookup [`Code`] to a [`Label`].
#[async_trait]
pub trait LabelResolver: Send + Sync {
    /// Resolves `code`, returning [`Label::fallback`] on any failure.
    ///
    /// The caller is expected to hold an admission slot for the duration of
    /// the call; implementations may still add their own throttling.
    async fn resolve(&self, code: &Code) -> Label;
}

/// The category a file is shelved under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);
impl Label {
    /// Literal value used whenever a code could not be resolved.
    pub const FALLBACK: &'static str = "Unknown";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn fallback() -> Self {
        Self(Self::FALLBACK.to_string())
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == Self::FALLBACK
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<String> for Label {
    fn from(label: String) -> Self {
        Self(label)
    }
}
impl From<&str> for Label {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}
impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
