//! Tag enumeration and last release detection.

use git2::Repository;
use semver::Version;
use tracing::{debug, warn};

use crate::error::GitError;
use crate::version::normalize_tag_version;

/// A release tag: the name as it exists in the repository plus its
/// normalized version (`v1.2` normalizes to `1.2.0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub name: String,
    pub version: Version,
}

impl ReleaseTag {
    /// Interpret a tag name as a release tag.
    ///
    /// Only `v<major>.<minor>` and `v<major>.<minor>.<patch>` qualify.
    pub fn from_name(name: &str) -> Option<Self> {
        if !name.starts_with('v') {
            return None;
        }
        normalize_tag_version(name).map(|version| Self {
            name: name.to_string(),
            version,
        })
    }
}

/// Find the highest release tag in the repository.
///
/// Returns `None` when no tag looks like a release.
pub fn last_release(repo: &Repository) -> Result<Option<ReleaseTag>, GitError> {
    let names = get_all_tag_names(repo)?;
    let latest = select_last_release(names.iter().map(String::as_str));

    match &latest {
        Some(tag) => debug!(tag = %tag.name, version = %tag.version, "Found last release tag"),
        None => debug!("No release tags found in repository"),
    }

    Ok(latest)
}

/// Pick the highest release tag from a list of tag names.
pub fn select_last_release<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<ReleaseTag> {
    let mut tags: Vec<ReleaseTag> = names.into_iter().filter_map(ReleaseTag::from_name).collect();
    tags.sort_by(|a, b| b.version.cmp(&a.version));
    tags.into_iter().next()
}

/// Get the names of all tags in the repository.
pub fn get_all_tag_names(repo: &Repository) -> Result<Vec<String>, GitError> {
    let mut names = Vec::new();

    repo.tag_foreach(|oid, name_bytes| {
        if let Ok(name_str) = std::str::from_utf8(name_bytes) {
            let name = name_str.strip_prefix("refs/tags/").unwrap_or(name_str);
            names.push(name.to_string());
        } else {
            warn!("Skipping tag with OID {} - name is not valid UTF-8", oid);
        }
        true
    })
    .map_err(GitError::ListTags)?;

    Ok(names)
}
