pub mod error;
mod models;
mod path;
mod shelf;
mod walk;

pub use crate::models::{FileInfo, Placement};
pub use crate::path::validate_component;
pub use crate::shelf::Shelf;
pub use crate::walk::{FileInfoStream, walk};
