//! Sorts media files into per-label folders.
//!
//! Each file's name is reduced to a lookup [code](code::normalize), the code
//! is [resolved](resolve::LabelResolver) to a label, and the file is moved to
//! `root/<label>/`. See [`organize`] for the run coordinator.

pub mod code;
mod context;
pub mod error;
pub mod organize;
pub mod resolve;
pub mod scan;

pub use crate::context::{Context, DEFAULT_MAX_CONCURRENCY};
pub use crate::organize::{OrganizeEvent, RunStats, run};
