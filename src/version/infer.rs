//! Next version inference from branch names and merge history.

use std::sync::LazyLock;

use git2::Repository;
use regex_lite::Regex;
use tracing::debug;

use crate::config::ReleaseContext;
use crate::error::GitError;
use crate::git::merge_summaries;

static BUMP_BRANCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^bump-version-(\d+(?:\.\d+)+)$").expect("valid bump branch regex")
});

/// The merged branch of a GitHub PR merge or a `git merge` summary. The
/// version must end the branch name.
static BUMP_MERGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Merge (?:pull request #\d+ from [^/\s]+/|(?:remote-tracking )?branch '(?:[^/'\s]+/)?)bump-version-(\d+(?:\.\d+)+)(?:'|\s|$)",
    )
    .expect("valid bump merge regex")
});

/// Determine the version being released.
///
/// Priority:
/// 1. the explicit override, returned unchanged
/// 2. a `bump-version-<version>` current branch
/// 3. on the main branch, the newest merge of a `bump-version-<version>` branch
///
/// Returns `None` when nothing applies.
pub fn next_version(ctx: &ReleaseContext, repo: &Repository) -> Result<Option<String>, GitError> {
    if let Some(version) = &ctx.next_version_override {
        debug!(%version, "Using explicit next version");
        return Ok(Some(version.clone()));
    }

    if let Some(version) = version_from_branch(&ctx.current_branch) {
        debug!(%version, branch = %ctx.current_branch, "Inferred next version from branch name");
        return Ok(Some(version));
    }

    if ctx.is_main_branch() {
        let summaries = merge_summaries(repo, None)?;
        let version = version_from_merge_lines(summaries.iter().map(String::as_str));
        if let Some(version) = &version {
            debug!(%version, "Inferred next version from merged bump branch");
        }
        return Ok(version);
    }

    Ok(None)
}

/// Extract the version from a `bump-version-<version>` branch name.
pub fn version_from_branch(branch: &str) -> Option<String> {
    BUMP_BRANCH
        .captures(branch)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Find the first merge of a bump branch among merge commit summaries.
pub fn version_from_merge_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<String> {
    lines.into_iter().find_map(|line| {
        BUMP_MERGE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}
