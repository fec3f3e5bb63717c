//! File discovery.
//!
//! Walks a root directory and turns every file with a valid media extension
//! into a [`FileTask`]. Everything else is ignored without a trace: files
//! filtered out here are never counted anywhere.

mod stream;

pub use self::stream::discover;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A discovered file awaiting its pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// Directory containing the file.
    pub source_directory: PathBuf,
    pub filename: String,
    /// Root that label folders are created directly under.
    pub destination_root: PathBuf,
}
impl FileTask {
    pub fn source(&self) -> PathBuf {
        self.source_directory.join(&self.filename)
    }
}

/// Set of valid media extensions, matched case-insensitively.
///
/// Extensions are stored lowercase without a leading dot; both `".MP4"` and
/// `"mp4"` are accepted on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extensions(BTreeSet<String>);
impl Extensions {
    pub fn new(extensions: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self(
            extensions
                .into_iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    pub fn matches(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.0.contains(&e.to_lowercase()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
impl Default for Extensions {
    fn default() -> Self {
        Self::new(["mp4", "mkv", "wmv", "avi"])
    }
}
