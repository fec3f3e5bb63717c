use crate::resolve::ResolverHandle;
use crate::scan::Extensions;
use std::num::NonZeroUsize;

/// Admission gate size used unless configured otherwise.
pub const DEFAULT_MAX_CONCURRENCY: NonZeroUsize = NonZeroUsize::new(5).unwrap();

/// Everything a run needs besides the root directory.
#[derive(Clone)]
pub struct Context {
    pub resolver: ResolverHandle,
    /// Substrings removed from filenames before deriving codes, and from the
    /// name a file is shelved under.
    pub removables: Vec<String>,
    pub extensions: Extensions,
    pub max_concurrency: NonZeroUsize,
}

impl Context {
    pub fn new(resolver: ResolverHandle) -> Self {
        Self {
            resolver,
            removables: Vec::new(),
            extensions: Extensions::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    #[must_use]
    pub fn with_removables(mut self, removables: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.removables = removables.into_iter().map(Into::into).filter(|r: &String| !r.is_empty()).collect();
        self
    }

    #[must_use]
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: NonZeroUsize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}
