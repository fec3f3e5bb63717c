use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-TW,zh;q=0.8,en-US;q=0.5,en;q=0.3";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Substrings removed (exact, case-sensitive, every occurrence) from
    /// filenames before a lookup code is derived.
    pub remove_strings: Vec<String>,
    /// Media extensions eligible for sorting, lowercase without a leading dot.
    pub extensions: Vec<String>,
    /// Maximum number of files in flight at once.
    pub max_concurrency: usize,
    pub lookup: Lookup,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            remove_strings: vec!["hhd800.com@".to_string()],
            extensions: ["mp4", "mkv", "wmv", "avi"].into_iter().map(String::from).collect(),
            max_concurrency: 5,
            lookup: Lookup::default(),
        }
    }
}

/// Remote lookup settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lookup {
    /// Service root; the code is appended as a single path segment.
    pub base_url: String,
    /// Per-request timeout. A stalled request would otherwise hold an
    /// admission slot indefinitely.
    pub timeout_secs: u64,
    /// Randomized delay applied before every request.
    pub delay: Delay,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}
impl Default for Lookup {
    fn default() -> Self {
        Self {
            base_url: "https://www.javbus.com".to_string(),
            timeout_secs: 30,
            delay: Delay::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

/// Inclusive bounds, in milliseconds, of the uniformly distributed
/// pre-request delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delay {
    pub min_ms: u64,
    pub max_ms: u64,
}
impl Default for Delay {
    fn default() -> Self {
        Self { min_ms: 1_000, max_ms: 3_000 }
    }
}
impl Delay {
    /// No delay at all; useful for tests and local mirrors.
    pub const NONE: Self = Self { min_ms: 0, max_ms: 0 };
}

impl Config {
    /// Normalizes loosely-written values and rejects unusable ones.
    ///
    /// - extensions are trimmed, lowercased, stripped of a leading `.` and
    ///   deduplicated (first occurrence wins);
    /// - empty removable substrings are dropped;
    /// - the base URL loses any trailing `/`.
    pub fn validated(mut self) -> Result<Self> {
        let mut extensions: Vec<String> = Vec::with_capacity(self.extensions.len());
        for ext in &self.extensions {
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        if extensions.is_empty() {
            exn::bail!(ErrorKind::Invalid {
                field: "extensions",
                reason: "at least one media extension is required".to_string(),
            });
        }
        self.extensions = extensions;
        self.remove_strings.retain(|s| !s.is_empty());

        if self.max_concurrency == 0 {
            exn::bail!(ErrorKind::Invalid {
                field: "max_concurrency",
                reason: "must be at least 1".to_string(),
            });
        }

        self.lookup.base_url = self.lookup.base_url.trim().trim_end_matches('/').to_string();
        if self.lookup.base_url.is_empty() {
            exn::bail!(ErrorKind::Invalid {
                field: "lookup.base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.lookup.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid {
                field: "lookup.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.lookup.delay.min_ms > self.lookup.delay.max_ms {
            exn::bail!(ErrorKind::Invalid {
                field: "lookup.delay",
                reason: format!(
                    "min_ms ({}) is greater than max_ms ({})",
                    self.lookup.delay.min_ms, self.lookup.delay.max_ms
                ),
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default().validated().unwrap();
        assert_eq!(config, Config::default());
    }

    #[rstest]
    #[case(&["mp4"], &["mp4"])]
    #[case(&[".MKV", "mkv", " avi "], &["mkv", "avi"])]
    #[case(&["", ".", "wmv"], &["wmv"])]
    fn test_extension_normalization(#[case] input: &[&str], #[case] expected: &[&str]) {
        let config = Config {
            extensions: input.iter().map(|s| s.to_string()).collect(),
            ..Config::default()
        };
        assert_eq!(config.validated().unwrap().extensions, expected);
    }

    #[test]
    fn test_empty_remove_strings_dropped() {
        let config = Config {
            remove_strings: vec![String::new(), "x@".to_string()],
            ..Config::default()
        };
        assert_eq!(config.validated().unwrap().remove_strings, vec!["x@".to_string()]);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let mut config = Config::default();
        config.lookup.base_url = "https://example.com//".to_string();
        assert_eq!(config.validated().unwrap().lookup.base_url, "https://example.com");
    }

    #[rstest]
    #[case::no_extensions(Config { extensions: vec![".".to_string()], ..Config::default() }, "extensions")]
    #[case::zero_concurrency(Config { max_concurrency: 0, ..Config::default() }, "max_concurrency")]
    fn test_rejected(#[case] config: Config, #[case] expected: &'static str) {
        let err = config.validated().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid { field, .. } if *field == expected));
    }

    #[test]
    fn test_rejected_delay_bounds() {
        let mut config = Config::default();
        config.lookup.delay = Delay { min_ms: 10, max_ms: 5 };
        let err = config.validated().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid { field: "lookup.delay", .. }));
    }

    #[test]
    fn test_rejected_zero_timeout() {
        let mut config = Config::default();
        config.lookup.timeout_secs = 0;
        assert!(config.validated().is_err());
    }
}
