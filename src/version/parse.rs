//! Strict `<major>.<minor>.<patch>` parsing and tag normalization.

use std::sync::LazyLock;

use regex_lite::Regex;
use semver::Version;

static FULL_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)$").expect("valid version regex"));

static SHORT_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)$").expect("valid short version regex"));

/// Parse a `M.N.P` string into a version triple.
///
/// Unlike [`Version::parse`], this accepts only three dotted numeric
/// components: no pre-release or build suffix, no surrounding whitespace.
/// Components that overflow `u64` are rejected.
pub fn parse_version(input: &str) -> Option<Version> {
    let caps = FULL_VERSION.captures(input)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = caps.get(3)?.as_str().parse().ok()?;
    Some(Version::new(major, minor, patch))
}

/// Normalize a tag body into a version.
///
/// Accepts `1.2.3`, `v1.2.3`, `1.2` and `v1.2`. Two-component forms get
/// a zero patch appended.
pub fn normalize_tag_version(tag: &str) -> Option<Version> {
    let body = tag.strip_prefix('v').unwrap_or(tag);

    if let Some(version) = parse_version(body) {
        return Some(version);
    }

    let caps = SHORT_VERSION.captures(body)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some(Version::new(major, minor, 0))
}
