//! Recursive directory walking.

use crate::FileInfo;
use crate::error::{ErrorKind, Result};
use async_stream::stream;
use futures::Stream;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs::{self, DirEntry};

pub type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

enum WalkEntry {
    File(FileInfo),
    Descend(PathBuf),
    Skip,
}

/// Streams every regular file beneath `root`, depth-first, in no particular
/// order.
///
/// Symlinks to files are followed; symlinks to directories are not descended
/// into (no cycle detection needed) and broken symlinks are silently dropped.
///
/// The root itself not existing, or any directory being unreadable, is
/// yielded as an error and the walk carries on; it's up to the caller to
/// decide whether that is fatal. The one exception is a *sub*directory that
/// disappears between being listed and being read, which is skipped.
pub fn walk<'a>(root: &'a Path) -> FileInfoStream<'a> {
    let mut stack = vec![root.to_path_buf()];
    Box::pin(stream! {
        'dirs: while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound && current != root => continue 'dirs,
                Err(err) => {
                    yield Err(exn::Exn::from(ErrorKind::from_io(err, &current)));
                    continue 'dirs;
                },
            };

            'entries: loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break 'entries,
                    Err(e) => {
                        yield Err(exn::Exn::from(ErrorKind::from_io(e, &current)));
                        continue 'dirs;
                    },
                };
                match process_entry(entry).await {
                    Ok(WalkEntry::File(f)) => yield Ok(f),
                    Ok(WalkEntry::Descend(d)) => stack.push(d),
                    Ok(WalkEntry::Skip) => {},
                    Err(e) => yield Err(e),
                };
            }
        }
    })
}

/// Keeps the `?`-able parts of the walk out of the stream body, where errors
/// have to be yielded by hand.
async fn process_entry(entry: DirEntry) -> Result<WalkEntry> {
    let path = entry.path();
    let file_type = entry.file_type().await.map_err(|e| ErrorKind::from_io(e, &path))?;
    if file_type.is_dir() {
        return Ok(WalkEntry::Descend(path));
    }
    let metadata = match file_type.is_symlink() {
        true => match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            // Dangling symlink.
            Err(_) => return Ok(WalkEntry::Skip),
        },
        false => entry.metadata().await.map_err(|e| ErrorKind::from_io(e, &path))?,
    };
    if metadata.is_file() {
        return Ok(WalkEntry::File(FileInfo::new(path, metadata.len())));
    }
    Ok(WalkEntry::Skip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    async fn collect(root: &Path) -> Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = walk(root).map_ok(|f| f.path).try_collect().await?;
        paths.sort();
        Ok(paths)
    }

    #[tokio::test]
    async fn test_walks_nested_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("a/b/c")).unwrap();
        std::fs::write(root.join("top.mp4"), b"1").unwrap();
        std::fs::write(root.join("a/one.mkv"), b"22").unwrap();
        std::fs::write(root.join("a/b/c/deep.avi"), b"333").unwrap();

        let paths = collect(root).await.unwrap();
        assert_eq!(paths, vec![root.join("a/b/c/deep.avi"), root.join("a/one.mkv"), root.join("top.mp4")]);
    }

    #[tokio::test]
    async fn test_reports_sizes() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("file.mp4"), b"12345").unwrap();
        let files: Vec<FileInfo> = walk(temp_dir.path()).try_collect().await.unwrap();
        assert_eq!(files, vec![FileInfo::new(temp_dir.path().join("file.mp4"), 5)]);
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("empty")).unwrap();
        assert!(collect(temp_dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing");
        let err = collect(&missing).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(p) if *p == missing));
    }

    #[tokio::test]
    async fn test_root_is_a_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("file.mp4");
        std::fs::write(&file, b"data").unwrap();
        assert!(collect(&file).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("root");
        let outside = temp_dir.path().join("outside");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&outside).unwrap();
        std::fs::write(outside.join("target.mp4"), b"data").unwrap();
        std::os::unix::fs::symlink(outside.join("target.mp4"), root.join("link.mp4")).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("linked-dir")).unwrap();
        std::os::unix::fs::symlink(root.join("nowhere.mp4"), root.join("dangling.mp4")).unwrap();

        assert_eq!(collect(&root).await.unwrap(), vec![root.join("link.mp4")]);
    }
}
