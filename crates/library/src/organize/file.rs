use crate::Context;
use crate::code::{self, Code};
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::organize::error::{ErrorKind as OrganizeErrorKind, Result as OrganizeResult};
use crate::resolve::Label;
use crate::scan::FileTask;
use exn::ResultExt;
use shelve_storage::error::ErrorKind as StorageErrorKind;
use shelve_storage::{Placement, Shelf};
use std::ops::Deref;
use std::path::PathBuf;
use tokio::fs;
use tracing::instrument;

/// Why a discovered file was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The file disappeared (or stopped being a regular file) after discovery.
    Missing,
    /// The file's extension is not a valid media extension.
    Unsupported,
}

/// A file that was shelved under its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    /// Name the file was discovered under.
    pub filename: String,
    pub code: Code,
    pub label: Label,
    /// Where the file is now; its name may carry a `_N` collision suffix.
    pub path: PathBuf,
    /// `true` when the file already sat at its destination.
    pub already_placed: bool,
}

/// The outcome of (successfully) running a single file's pipeline.
///
/// Only [`Outcome::Relocated`] counts as a success; a skipped file still
/// counts as a failure in [`RunStats`](crate::organize::RunStats).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Relocated(Relocation),
    Skipped { path: PathBuf, reason: SkipReason },
}
impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Relocated(_))
    }
}

/// Runs the normalize → resolve → relocate pipeline for one file.
///
/// The file is shelved under `destination_root/label/` using its *stripped*
/// filename (removable substrings taken out), not its code. Resolution
/// never fails; a file whose code can't be resolved ends up under the
/// [fallback label](Label::fallback).
///
/// Admission control is the caller's business: this function does no
/// throttling of its own beyond the resolver's delay.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Organize>`](LibraryErrorKind::Organize)
/// raised from an inner [`Exn<OrganizeErrorKind>`](OrganizeErrorKind) when
/// the file can't be placed.
pub async fn organize_file(ctx: &Context, task: &FileTask) -> LibraryResult<Outcome> {
    organize_file_inner(ctx, task).await.or_raise(|| LibraryErrorKind::Organize)
}

#[instrument(level = "debug", skip(ctx, task), fields(filename = %task.filename))]
pub(crate) async fn organize_file_inner(ctx: &Context, task: &FileTask) -> OrganizeResult<Outcome> {
    let source = task.source();
    if !fs::metadata(&source).await.is_ok_and(|m| m.is_file()) {
        tracing::warn!(path = %source.display(), "File no longer exists; skipping");
        return Ok(Outcome::Skipped { path: source, reason: SkipReason::Missing });
    }
    if !ctx.extensions.matches(&task.filename) {
        tracing::warn!(filename = %task.filename, "Unsupported file type; skipping");
        return Ok(Outcome::Skipped { path: source, reason: SkipReason::Unsupported });
    }

    let stripped = code::strip(&task.filename, ctx.removables.as_slice());
    let target_name = if stripped.is_empty() { task.filename.clone() } else { stripped };
    let code = code::normalize(&task.filename, ctx.removables.as_slice());
    tracing::info!(%code, filename = %task.filename, "Derived lookup code");

    let label = ctx.resolver.resolve(&code).await;

    let shelf = Shelf::new(&task.destination_root);
    let placement = match shelf.place(&source, label.as_str(), &target_name).await {
        Ok(placement) => placement,
        Err(e) if matches!(e.deref(), StorageErrorKind::NotFound(path) if *path == source) => {
            tracing::warn!(path = %source.display(), "File vanished before it could be moved; skipping");
            return Ok(Outcome::Skipped { path: source, reason: SkipReason::Missing });
        },
        Err(e) => {
            tracing::error!(filename = %task.filename, %label, error = ?e, "Could not move file");
            return Err(e).or_raise(|| OrganizeErrorKind::Storage);
        },
    };

    let already_placed = matches!(placement, Placement::AlreadyPlaced(_));
    let path = placement.into_path();
    if already_placed {
        tracing::info!(path = %path.display(), "File already in place");
    } else {
        let final_name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        tracing::info!(%code, "Moved {} → {label}/{final_name}", task.filename);
    }
    Ok(Outcome::Relocated(Relocation {
        filename: task.filename.clone(),
        code,
        label,
        path,
        already_placed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::MockResolver;
    use std::fs as stdfs;
    use std::path::Path;
    use std::sync::Arc;

    fn task(root: &Path, directory: &Path, filename: &str) -> FileTask {
        FileTask {
            source_directory: directory.to_path_buf(),
            filename: filename.to_string(),
            destination_root: root.to_path_buf(),
        }
    }

    fn context(labels: &[(&str, &str)]) -> Context {
        Context::new(Arc::new(MockResolver::with_labels(labels.iter().copied()))).with_removables(["hhd800.com@"])
    }

    #[tokio::test]
    async fn test_relocates_under_stripped_name() {
        let root = tempfile::tempdir().unwrap();
        stdfs::write(root.path().join("X-1-hhd800.com@.mp4"), b"video").unwrap();

        let ctx = context(&[("X-1", "Jane")]);
        let outcome = organize_file(&ctx, &task(root.path(), root.path(), "X-1-hhd800.com@.mp4")).await.unwrap();

        let Outcome::Relocated(relocation) = outcome else { panic!("expected relocation, got {outcome:?}") };
        assert_eq!(relocation.code.as_str(), "X-1");
        assert_eq!(relocation.label.as_str(), "Jane");
        assert_eq!(relocation.path, root.path().join("Jane/X-1-.mp4"));
        assert!(!relocation.already_placed);
        assert_eq!(stdfs::read(&relocation.path).unwrap(), b"video");
        assert!(!root.path().join("X-1-hhd800.com@.mp4").exists());
    }

    #[tokio::test]
    async fn test_unresolved_code_goes_to_fallback_folder() {
        let root = tempfile::tempdir().unwrap();
        stdfs::write(root.path().join("abc_123_part2.avi"), b"video").unwrap();

        let ctx = context(&[]);
        let outcome = organize_file(&ctx, &task(root.path(), root.path(), "abc_123_part2.avi")).await.unwrap();

        let Outcome::Relocated(relocation) = outcome else { panic!("expected relocation, got {outcome:?}") };
        assert_eq!(relocation.code.as_str(), "abc-123");
        assert!(relocation.label.is_fallback());
        assert_eq!(relocation.path, root.path().join("Unknown/abc_123_part2.avi"));
    }

    #[tokio::test]
    async fn test_missing_file_is_skipped_without_lookup() {
        let root = tempfile::tempdir().unwrap();
        let resolver = Arc::new(MockResolver::new());
        let ctx = Context::new(resolver.clone());

        let outcome = organize_file(&ctx, &task(root.path(), root.path(), "ABC-123.mp4")).await.unwrap();

        assert_eq!(outcome, Outcome::Skipped {
            path: root.path().join("ABC-123.mp4"),
            reason: SkipReason::Missing
        });
        assert!(resolver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_file_is_skipped_without_lookup() {
        let root = tempfile::tempdir().unwrap();
        stdfs::write(root.path().join("ABC-123.txt"), b"notes").unwrap();
        let resolver = Arc::new(MockResolver::new());
        let ctx = Context::new(resolver.clone());

        let outcome = organize_file(&ctx, &task(root.path(), root.path(), "ABC-123.txt")).await.unwrap();

        assert!(matches!(outcome, Outcome::Skipped { reason: SkipReason::Unsupported, .. }));
        assert!(!outcome.is_success());
        assert!(resolver.calls().is_empty());
        assert!(root.path().join("ABC-123.txt").exists());
    }

    #[tokio::test]
    async fn test_file_already_in_place() {
        let root = tempfile::tempdir().unwrap();
        stdfs::create_dir(root.path().join("Jane")).unwrap();
        stdfs::write(root.path().join("Jane/X-1.mp4"), b"video").unwrap();

        let ctx = context(&[("X-1", "Jane")]);
        let outcome = organize_file(&ctx, &task(root.path(), &root.path().join("Jane"), "X-1.mp4")).await.unwrap();

        let Outcome::Relocated(relocation) = outcome else { panic!("expected relocation, got {outcome:?}") };
        assert!(relocation.already_placed);
        assert_eq!(relocation.path, root.path().join("Jane/X-1.mp4"));
        assert!(!root.path().join("Jane/X-1_1.mp4").exists());
    }

    #[tokio::test]
    async fn test_unsafe_label_fails() {
        let root = tempfile::tempdir().unwrap();
        stdfs::write(root.path().join("X-1.mp4"), b"video").unwrap();

        let ctx = context(&[("X-1", "a/b")]);
        let err = organize_file(&ctx, &task(root.path(), root.path(), "X-1.mp4")).await.unwrap_err();

        assert!(matches!(&*err, LibraryErrorKind::Organize));
        assert!(root.path().join("X-1.mp4").exists());
        assert!(!root.path().join("a").exists());
    }
}
