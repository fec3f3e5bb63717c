//! Configuration for `shelve`.
//!
//! Sources are layered with [`figment`], later sources overriding earlier ones:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. `config.{toml,yaml,json}` in the platform configuration directory,
//! 3. an explicitly requested file (format picked from its extension),
//! 4. environment variables prefixed `SHELVE_`, nested keys split on `__`
//!    (e.g. `SHELVE_LOOKUP__BASE_URL`).
//!
//! Command-line overrides are applied by the binary on the returned
//! [`Config`], followed by another call to [`Config::validated`].

pub mod error;
mod load;
mod models;

pub use crate::load::{default_dir, figment, load};
pub use crate::models::{Config, Delay, Lookup};
