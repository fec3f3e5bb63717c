//! Lookup code derivation from filenames.
//!
//! Filenames like `ABC-123-hhd800.com@.mp4` or `abc_123_part2.avi` carry an
//! identifying code (`ABC-123`, `abc-123`) somewhere near the front. The code
//! is the first two segments of the extensionless name, split on the first
//! separator kind present (hyphen before underscore) and always re-joined
//! with a hyphen.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

/// A lookup code derived from a filename by [`normalize`].
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code(String);
impl Code {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl AsRef<str> for Code {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Display for Code {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Removes every occurrence of every removable substring, in order.
///
/// This is also the name a file is shelved under.
///
/// ```
/// use shelve_library::code::strip;
/// assert_eq!(strip("ABC-123-hhd800.com@.mp4", &["hhd800.com@"]), "ABC-123-.mp4");
/// ```
pub fn strip(filename: &str, removables: &[impl AsRef<str>]) -> String {
    removables
        .iter()
        .map(AsRef::as_ref)
        .filter(|removable| !removable.is_empty())
        .fold(filename.to_string(), |name, removable| name.replace(removable, ""))
}

/// Derives the lookup [`Code`] for a filename.
///
/// 1. Strip removable substrings (see [`strip`]).
/// 2. Drop the extension.
/// 3. If there's a `-`, keep the first two `-`-delimited segments; otherwise,
///    if there's a `_`, keep the first two `_`-delimited segments joined by a
///    `-`; otherwise keep the extensionless name as-is.
///
/// If stripping leaves nothing to work with, the original filename is used
/// instead so that the code is never empty.
///
/// ```
/// use shelve_library::code::normalize;
/// assert_eq!(normalize("ABC-123-hhd800.com@.mp4", &["hhd800.com@"]).as_str(), "ABC-123");
/// assert_eq!(normalize("abc_123_part2.avi", &[] as &[&str]).as_str(), "abc-123");
/// assert_eq!(normalize("abc123.mkv", &[] as &[&str]).as_str(), "abc123");
/// ```
pub fn normalize(filename: &str, removables: &[impl AsRef<str>]) -> Code {
    let stripped = strip(filename, removables);
    let stem = stem(&stripped).or_else(|| stem(filename)).unwrap_or(filename);
    Code(first_two_segments(stem))
}

fn stem(name: &str) -> Option<&str> {
    Path::new(name).file_stem().and_then(|s| s.to_str()).filter(|s| !s.is_empty())
}

fn first_two_segments(stem: &str) -> String {
    let separator = match (stem.contains('-'), stem.contains('_')) {
        (true, _) => '-',
        (false, true) => '_',
        (false, false) => return stem.to_string(),
    };
    match stem.split_once(separator) {
        Some((first, rest)) => {
            let second = rest.split(separator).next().unwrap_or_default();
            format!("{first}-{second}")
        },
        None => stem.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const REMOVABLES: &[&str] = &["hhd800.com@"];

    #[rstest]
    #[case("ABC-123-hhd800.com@.mp4", "ABC-123")]
    #[case("abc_123_part2.avi", "abc-123")]
    #[case("abc123.mkv", "abc123")]
    #[case("ABC-123.mp4", "ABC-123")]
    #[case("hhd800.com@ABC-123.mp4", "ABC-123")]
    #[case("ABC-123-C.mp4", "ABC-123")]
    #[case("ABC-123_part1.mp4", "ABC-123_part1")]
    #[case("abc_123-x_y.wmv", "abc_123-x_y")]
    #[case("ABC-.mp4", "ABC-")]
    #[case("-123-x.mp4", "-123")]
    #[case("no extension", "no extension")]
    #[case("a.b.c-d.mp4", "a.b.c-d")]
    #[case("hhd800.com@hhd800.com@XYZ-9.mp4", "XYZ-9")]
    fn test_normalize(#[case] filename: &str, #[case] expected: &str) {
        assert_eq!(normalize(filename, REMOVABLES).as_str(), expected);
    }

    #[test]
    fn test_removables_are_case_sensitive() {
        assert_eq!(strip("ABC-1-HHD800.COM@.mp4", REMOVABLES), "ABC-1-HHD800.COM@.mp4");
    }

    #[test]
    fn test_removables_apply_in_order() {
        assert_eq!(strip("aXbYc.mp4", &["XbY", "b"]), "ac.mp4");
        assert_eq!(strip("aXbYc.mp4", &["b", "XbY"]), "aXYc.mp4");
    }

    #[test]
    fn test_never_empty() {
        // Stripping leaves only the extension behind.
        let code = normalize("hhd800.com@.mp4", REMOVABLES);
        assert!(!code.as_str().is_empty());
        // Stripping leaves nothing at all; fall back to the original stem.
        let code = normalize("hhd800.com@", REMOVABLES);
        assert_eq!(code.as_str(), "hhd800");
    }

    #[rstest]
    #[case("ABC-123-hhd800.com@.mp4")]
    #[case("abc_123_part2.avi")]
    #[case("abc123.mkv")]
    #[case("ABC-123_part1.mp4")]
    #[case("abc_123-x_y.wmv")]
    #[case("a.b.c-d.mp4")]
    #[case("X_Y.mp4")]
    fn test_stable_under_reapplication(#[case] filename: &str) {
        let once = normalize(filename, REMOVABLES);
        let twice = normalize(&format!("{once}.mp4"), REMOVABLES);
        assert_eq!(once, twice);
    }
}
