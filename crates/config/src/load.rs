use crate::Config;
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::path::{Path, PathBuf};
use tracing::instrument;

const ENV_PREFIX: &str = "SHELVE_";
const ENV_SPLIT: &str = "__";
const FILE_STEM: &str = "config";

/// Platform-specific directory searched for `config.{toml,yaml,json}`.
///
/// `None` when no home directory can be determined (minimal containers etc.),
/// in which case only defaults, explicit files and the environment apply.
pub fn default_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "shelve").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Builds the layered [`Figment`] without extracting it.
///
/// Exposed separately from [`load`] so that callers (and tests) can add their
/// own providers on top before extraction.
pub fn figment(explicit: Option<&Path>) -> Result<Figment> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(dir) = default_dir() {
        // Missing files are silently skipped by figment.
        figment = figment
            .merge(Toml::file(dir.join(FILE_STEM).with_extension("toml")))
            .merge(Yaml::file(dir.join(FILE_STEM).with_extension("yaml")))
            .merge(Json::file(dir.join(FILE_STEM).with_extension("json")));
    }
    if let Some(path) = explicit {
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        figment = match path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("toml") => figment.merge(Toml::file(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        };
    }
    Ok(figment.merge(Env::prefixed(ENV_PREFIX).split(ENV_SPLIT)))
}

/// Loads and validates the configuration from every layered source.
#[instrument(level = "debug")]
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let config: Config = figment(explicit)?.extract().or_raise(|| ErrorKind::Load)?;
    tracing::debug!(?config, "Loaded configuration");
    config.validated()
}
