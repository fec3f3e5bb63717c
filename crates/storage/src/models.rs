//! Storage models.

use std::path::{Path, PathBuf};

/// A regular file found while walking a directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Path of the file, rooted at whatever root the walk started from.
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self { path: path.into(), size }
    }
}

/// Where a file ended up after [`Shelf::place`](crate::Shelf::place).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The file was moved; the final name may carry a `_N` collision suffix.
    Moved(PathBuf),
    /// The file already sat at its destination; nothing was touched.
    AlreadyPlaced(PathBuf),
}
impl Placement {
    pub fn path(&self) -> &Path {
        match self {
            Self::Moved(path) | Self::AlreadyPlaced(path) => path,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            Self::Moved(path) | Self::AlreadyPlaced(path) => path,
        }
    }
}
