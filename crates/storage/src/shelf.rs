//! Collision-safe placement of files into per-label folders.
//!
//! A [`Shelf`] is a root directory with one sub-directory per label. Files are
//! moved into `root/label/filename`; when that name is taken the file gets a
//! numeric suffix instead (`base_1.ext`, `base_2.ext`, ...). Nothing that is
//! already on the shelf is ever overwritten.

use crate::Placement;
use crate::error::{ErrorKind, Result};
use crate::path::validate_component;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tracing::instrument;

/// Upper bound on `_N` suffixes tried before giving up on a name.
const MAX_COLLISIONS: u32 = 10_000;

/// Local filesystem shelf.
///
/// # Examples
///
/// ```no_run
/// use shelve_storage::Shelf;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let shelf = Shelf::new("/media/inbox");
/// let placement = shelf.place(Path::new("/media/inbox/new/ABC-123.mp4"), "Jane Doe", "ABC-123.mp4").await?;
/// println!("moved to {}", placement.path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Shelf {
    root: PathBuf,
}
impl Shelf {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Moves `source` to `root/label/filename`, or to the first free
    /// `root/label/base_N.ext` if that name is taken.
    ///
    /// The destination folder (and any missing ancestors) is created if
    /// absent; concurrent creation of the same folder is harmless.
    ///
    /// The destination name is claimed with an exclusive create before the
    /// move, so two concurrent placements can never settle on the same name
    /// and no pre-existing file is ever replaced. The move itself is a rename
    /// where possible and a copy-then-delete across filesystems.
    ///
    /// # Errors
    /// - [`ErrorKind::InvalidComponent`] if `label` or `filename` is not a
    ///   single path component.
    /// - [`ErrorKind::NotFound`] if `source` does not exist or isn't a regular
    ///   file; nothing is created in that case.
    /// - [`ErrorKind::AlreadyExists`] if every candidate name is taken.
    /// - [`ErrorKind::Io`]/[`ErrorKind::PermissionDenied`] for anything else
    ///   the OS complains about.
    #[instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    pub async fn place(&self, source: &Path, label: &str, filename: &str) -> Result<Placement> {
        validate_component(label)?;
        validate_component(filename)?;
        match fs::metadata(source).await {
            Ok(metadata) if metadata.is_file() => {},
            Ok(_) => exn::bail!(ErrorKind::NotFound(source.to_path_buf())),
            Err(e) => exn::bail!(ErrorKind::from_io(e, source)),
        }

        let directory = self.root.join(label);
        fs::create_dir_all(&directory).await.map_err(|e| ErrorKind::from_io(e, &directory))?;

        let preferred = directory.join(filename);
        if preferred == source {
            return Ok(Placement::AlreadyPlaced(preferred));
        }

        let claimed = Self::claim(&directory, filename).await?;
        if let Err(e) = Self::relocate(source, &claimed).await {
            // Give the name back; the source is still where it was.
            _ = fs::remove_file(&claimed).await;
            return Err(e);
        }
        Ok(Placement::Moved(claimed))
    }

    /// Reserves the first free candidate name by creating an empty
    /// placeholder with `O_EXCL` semantics.
    async fn claim(directory: &Path, filename: &str) -> Result<PathBuf> {
        for attempt in 0..=MAX_COLLISIONS {
            let candidate = directory.join(candidate_name(filename, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&candidate).await {
                Ok(_) => {
                    if attempt > 0 {
                        tracing::debug!(path = %candidate.display(), attempt, "Destination name taken; using suffixed name");
                    }
                    return Ok(candidate);
                },
                Err(e) if e.kind() == IoErrorKind::AlreadyExists => continue,
                Err(e) => exn::bail!(ErrorKind::from_io(e, &candidate)),
            }
        }
        exn::bail!(ErrorKind::AlreadyExists(directory.join(filename)));
    }

    /// Moves `source` over the placeholder at `target`.
    async fn relocate(source: &Path, target: &Path) -> Result<()> {
        match fs::rename(source, target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::CrossesDevices => {
                tracing::debug!(source = %source.display(), target = %target.display(), "Cross-device move; copying");
                fs::copy(source, target).await.map_err(|e| ErrorKind::from_io(e, source))?;
                fs::remove_file(source).await.map_err(|e| ErrorKind::from_io(e, source))?;
                Ok(())
            },
            Err(e) => exn::bail!(ErrorKind::from_io(e, source)),
        }
    }
}

/// `filename` itself for the first attempt, then `base_N.ext`.
fn candidate_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    let path = Path::new(filename);
    match (path.file_stem().and_then(|s| s.to_str()), path.extension().and_then(|s| s.to_str())) {
        (Some(stem), Some(ext)) => format!("{stem}_{attempt}.{ext}"),
        _ => format!("{filename}_{attempt}"),
    }
}
