//! GitHub token lookup and authenticated remote URLs.
//!
//! The token is read from `GITHUB_TOKEN`, falling back to `GH_TOKEN`.

use std::env;

use crate::error::GitHubError;

use super::repo::RepoSlug;

const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Get a GitHub token from the environment, if one is set.
pub fn get_github_token() -> Option<String> {
    TOKEN_ENV_VARS.iter().find_map(|name| {
        env::var(name)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// HTTPS remote URL carrying the token, used for push and pull.
pub fn authenticated_remote_url(slug: &RepoSlug, token: &str) -> String {
    format!("https://x-access-token:{}@github.com/{}.git", token, slug)
}

/// Plain HTTPS remote URL.
pub fn remote_url(slug: &RepoSlug) -> String {
    format!("https://github.com/{}.git", slug)
}

/// Remote URL for pushing.
///
/// Without a token only a dry run can proceed, since nothing is pushed.
pub fn push_url(
    slug: &RepoSlug,
    token: Option<&str>,
    dry_run: bool,
) -> Result<String, GitHubError> {
    match token {
        Some(token) => Ok(authenticated_remote_url(slug, token)),
        None if dry_run => Ok(remote_url(slug)),
        None => Err(GitHubError::MissingToken),
    }
}
