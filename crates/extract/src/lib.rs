mod consts;
pub mod error;
mod extract;

pub use crate::extract::{extract, label};
