//! The run coordinator.
//!
//! Takes every file [discovered](crate::scan::discover) under a root through
//! its own normalize → resolve → relocate pipeline, bounded by an admission
//! gate, and accounts for the results in a [`RunStats`].
//!
//! The primary entry point is [`organize`], which streams
//! [`OrganizeEvent`]s for a display collaborator to follow; [`run`] drains
//! it for callers that only care about the final statistics. A single file
//! can be pushed through its pipeline with [`organize_file`].

pub mod error;
mod file;
mod stats;
mod stream;

pub use self::file::{Outcome, Relocation, SkipReason, organize_file};
pub use self::stats::RunStats;
pub use self::stream::{OrganizeEvent, organize, run};
