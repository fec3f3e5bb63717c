use super::{Extensions, FileTask};
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use async_stream::stream;
use futures::Stream;
use std::path::Path;

/// Streams a [`FileTask`] for every file beneath `root` with one of the
/// given extensions, depth-first in no particular order.
///
/// Each task's destination root is `root` itself. Filenames that aren't
/// valid UTF-8 can't be turned into lookup codes; they are logged and left
/// where they are.
///
/// # Errors
/// Yields [`LibraryErrorKind::Discovery`] for every directory that can't be
/// read (including `root` itself). The walk keeps going afterwards; callers
/// treating discovery errors as fatal should stop polling.
pub fn discover<'a>(root: &'a Path, extensions: &'a Extensions) -> impl Stream<Item = LibraryResult<FileTask>> + 'a {
    stream! {
        for await file in shelve_storage::walk(root) {
            let file = match file {
                Ok(file) => file,
                Err(e) => {
                    yield Err(e.raise(LibraryErrorKind::Discovery));
                    continue;
                },
            };
            if !extensions.matches(&file.path) {
                continue;
            }
            let (Some(directory), Some(filename)) = (file.path.parent(), file.path.file_name()) else {
                continue;
            };
            let Some(filename) = filename.to_str() else {
                tracing::warn!(path = %file.path.display(), "Skipping file with non-UTF-8 name");
                continue;
            };
            let relative = directory.strip_prefix(root).unwrap_or(directory);
            tracing::info!(filename, directory = %relative.display(), size = file.size, "Found media file");
            yield Ok(FileTask {
                source_directory: directory.to_path_buf(),
                filename: filename.to_string(),
                destination_root: root.to_path_buf(),
            });
        }
    }
}
