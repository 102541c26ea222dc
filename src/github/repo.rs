//! Repository slug (`owner/name`) handling.

use std::fmt;
use std::str::FromStr;

use git2::Repository;

use crate::error::GitHubError;

/// A GitHub repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Resolve the slug of the repository's `origin` remote.
    pub fn from_origin(repo: &Repository) -> Result<Self, GitHubError> {
        let remote = repo
            .find_remote("origin")
            .map_err(|_| GitHubError::UnknownRepository)?;
        let url = remote.url().ok_or(GitHubError::UnknownRepository)?;
        parse_github_remote(url)
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoSlug {
    type Err = GitHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(GitHubError::InvalidRepositoryUrl(s.to_string())),
        }
    }
}

/// Extract owner and repo from a git remote URL.
pub fn parse_github_remote(url: &str) -> Result<RepoSlug, GitHubError> {
    // SSH format: git@github.com:owner/repo.git
    if let Some(path) = url.strip_prefix("git@github.com:") {
        return parse_owner_repo_path(path, url);
    }

    // HTTPS format, possibly with credentials: https://[user@]github.com/owner/repo.git
    if let Some(path) = url.split("github.com/").nth(1) {
        return parse_owner_repo_path(path, url);
    }

    Err(GitHubError::InvalidRepositoryUrl(url.to_string()))
}

fn parse_owner_repo_path(path: &str, url: &str) -> Result<RepoSlug, GitHubError> {
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.split('/');

    match (parts.next(), parts.next()) {
        (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
            Ok(RepoSlug::new(owner, name))
        }
        _ => Err(GitHubError::InvalidRepositoryUrl(url.to_string())),
    }
}
