use crate::Context;
use crate::error::{Error as LibraryError, ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::organize::error::{ErrorKind as OrganizeErrorKind, Result as OrganizeResult};
use crate::organize::file::{Outcome, organize_file_inner};
use crate::organize::stats::RunStats;
use crate::scan::{FileTask, discover};
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::pin::pin;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Progress events emitted by [`organize`] as it works through a directory
/// tree.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once.
/// 2. [`FileDiscovered`](Self::FileDiscovered), once per eligible file.
/// 3. [`DiscoveryComplete`](Self::DiscoveryComplete), exactly once, with the
///    total file count.
/// 4. [`Organized`](Self::Organized) or [`Failed`](Self::Failed), once per
///    discovered file, in order of completion.
/// 5. [`Complete`](Self::Complete), exactly once, signalling the stream is
///    finished.
///
/// A fatal error terminates the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug)]
pub enum OrganizeEvent {
    Started,
    FileDiscovered(FileTask),
    DiscoveryComplete(u64),
    /// A file's pipeline finished; the file was either shelved or skipped.
    Organized(Outcome),
    /// A file's pipeline failed. The run carries on.
    Failed { path: PathBuf, error: LibraryError },
    Complete(RunStats),
}

/// Streams [`OrganizeEvent`]s while shelving every eligible file beneath
/// `root` into `root/<label>/`.
///
/// All files are discovered first, then each runs its own normalize →
/// resolve → relocate pipeline. At most `ctx.max_concurrency` pipelines are
/// in flight at once: a slot is taken before the resolver's delay and lookup,
/// and only given back once the file has been moved (or has failed). Every
/// pipeline runs to completion; one file failing never stops the others.
///
/// # Errors
/// Yields [`LibraryErrorKind::Discovery`] and ends the stream if the tree
/// can't be walked. Per-file failures are reported as
/// [`OrganizeEvent::Failed`], never as stream errors.
pub fn organize<'a>(ctx: &'a Context, root: &'a Path) -> impl Stream<Item = LibraryResult<OrganizeEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        let started_at = OffsetDateTime::now_utc();
        let clock = Instant::now();
        tracing::info!(root = %root.display(), started_at = %format_timestamp(started_at), "Starting run");
        yield Ok(OrganizeEvent::Started);

        let mut tasks = Vec::new();
        for await task in discover(root, &ctx.extensions) {
            match task {
                Ok(task) => {
                    tasks.push(task.clone());
                    yield Ok(OrganizeEvent::FileDiscovered(task));
                },
                Err(e) => {
                    tracing::error!(root = %root.display(), error = ?e, "Discovery failed; aborting run");
                    yield Err(e);
                    return;
                },
            }
        }
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        let total_discovered = u64::try_from(tasks.len()).unwrap_or(u64::MAX);
        if total_discovered == 0 {
            tracing::info!(root = %root.display(), "No media files found");
        } else {
            tracing::info!(total = total_discovered, "Discovery complete");
        }
        yield Ok(OrganizeEvent::DiscoveryComplete(total_discovered));

        let gate = Semaphore::new(ctx.max_concurrency.get());
        let mut processing: FuturesUnordered<_> = tasks.into_iter().map(|task| gated(ctx, &gate, task)).collect();
        let (mut succeeded, mut failed, mut skipped) = (0u64, 0u64, 0u64);
        while let Some((task, result)) = processing.next().await {
            match result {
                Ok(outcome) => {
                    if outcome.is_success() {
                        succeeded += 1;
                    } else {
                        failed += 1;
                        skipped += 1;
                    }
                    yield Ok(OrganizeEvent::Organized(outcome));
                },
                Err(e) => {
                    failed += 1;
                    yield Ok(OrganizeEvent::Failed {
                        path: task.source(),
                        error: e.raise(LibraryErrorKind::Organize),
                    });
                },
            }
        }

        let stats = RunStats {
            total_discovered,
            succeeded,
            failed,
            skipped,
            elapsed: clock.elapsed(),
            started_at,
            finished_at: OffsetDateTime::now_utc(),
        };
        tracing::info!(
            finished_at = %format_timestamp(stats.finished_at),
            total = stats.total_discovered,
            succeeded = stats.succeeded,
            failed = stats.failed,
            skipped = stats.skipped,
            elapsed_secs = %format!("{:.2}", stats.elapsed_seconds()),
            average_secs = %format!("{:.2}", stats.average_seconds().unwrap_or_default()),
            "Run complete",
        );
        yield Ok(OrganizeEvent::Complete(stats));
    })
}

/// Drains [`organize`], returning the final [`RunStats`].
///
/// # Errors
/// Returns the first fatal error yielded by [`organize`], or
/// [`LibraryErrorKind::Incomplete`] if the stream ends without completing.
pub async fn run(ctx: &Context, root: &Path) -> LibraryResult<RunStats> {
    let mut events = pin!(organize(ctx, root));
    while let Some(event) = events.next().await {
        if let OrganizeEvent::Complete(stats) = event? {
            return Ok(stats);
        }
    }
    exn::bail!(LibraryErrorKind::Incomplete)
}

/// One file's full pipeline, holding an admission slot throughout.
async fn gated(ctx: &Context, gate: &Semaphore, task: FileTask) -> (FileTask, OrganizeResult<Outcome>) {
    let _permit = match gate.acquire().await.or_raise(|| OrganizeErrorKind::Gate) {
        Ok(permit) => permit,
        Err(e) => return (task, Err(e)),
    };
    let result = organize_file_inner(ctx, &task).await;
    (task, result)
}

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp.format(&Rfc3339).unwrap_or_else(|_| timestamp.to_string())
}
