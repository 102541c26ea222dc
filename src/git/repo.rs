//! Repository access: opening, HEAD branch and configured identity.

use std::path::Path;

use git2::Repository;

use crate::error::GitError;

/// Open the repository containing `path`.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    Repository::discover(path).map_err(GitError::OpenRepository)
}

/// Get the short name of the branch HEAD points to.
pub fn current_branch(repo: &Repository) -> Result<String, GitError> {
    let head = repo
        .head()
        .map_err(|e| GitError::ReferenceNotFound("HEAD".to_string(), e))?;

    if !head.is_branch() {
        return Err(GitError::DetachedHead);
    }

    head.shorthand().map(String::from).ok_or(GitError::DetachedHead)
}

/// Read `user.name` and `user.email` from the repository config.
///
/// Returns `None` unless both are set and non-empty.
pub fn configured_identity(repo: &Repository) -> Option<(String, String)> {
    let config = repo.config().ok()?;
    let name = config.get_string("user.name").ok()?;
    let email = config.get_string("user.email").ok()?;

    if name.trim().is_empty() || email.trim().is_empty() {
        return None;
    }

    Some((name, email))
}
