//! Commit log reading: merge commits and pull request numbers.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use git2::Repository;
use regex_lite::Regex;

use crate::error::GitError;

static MERGED_PR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Merge pull request #(\d+)\b").expect("valid merge regex"));

/// Summaries of merge commits reachable from HEAD, newest first.
///
/// When `since` is given, commits reachable from that reference are
/// excluded (the `since..HEAD` range).
pub fn merge_summaries(repo: &Repository, since: Option<&str>) -> Result<Vec<String>, GitError> {
    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk.push_head().map_err(GitError::RevwalkError)?;
    revwalk
        .set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)
        .map_err(GitError::RevwalkError)?;

    if let Some(reference) = since {
        let commit = repo
            .revparse_single(reference)
            .map_err(|e| GitError::ReferenceNotFound(reference.to_string(), e))?
            .peel_to_commit()
            .map_err(GitError::ParseCommit)?;
        revwalk.hide(commit.id()).map_err(GitError::RevwalkError)?;
    }

    let mut summaries = Vec::new();
    for oid in revwalk {
        let oid = oid.map_err(GitError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
        if commit.parent_count() > 1 {
            summaries.push(commit.summary().unwrap_or_default().to_string());
        }
    }

    Ok(summaries)
}

/// Extract pull request numbers from merge commit summaries.
///
/// Returns unique numbers in ascending order.
pub fn pr_numbers_from_merges<'a>(summaries: impl IntoIterator<Item = &'a str>) -> Vec<u64> {
    summaries
        .into_iter()
        .filter_map(|line| MERGED_PR.captures(line))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u64>().ok())
        .filter(|number| *number > 0)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Full message of the commit at HEAD.
pub fn head_message(repo: &Repository) -> Result<String, GitError> {
    let commit = repo
        .head()
        .map_err(|e| GitError::ReferenceNotFound("HEAD".to_string(), e))?
        .peel_to_commit()
        .map_err(GitError::ParseCommit)?;
    Ok(commit.message().unwrap_or_default().to_string())
}
