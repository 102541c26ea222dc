//! Merged pull request aggregation via octocrab.

use git2::Repository;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{GitError, GitHubError};
use crate::git::{ReleaseTag, merge_summaries, pr_numbers_from_merges};

use super::repo::RepoSlug;

/// A merged pull request as it appears in changelogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub url: String,
}

impl ReleaseRecord {
    /// Nit PRs are trivial changes that stay out of changelogs.
    pub fn is_nit(&self) -> bool {
        is_nit_title(&self.title)
    }
}

/// Whether a PR title marks a nit (case-insensitive `nit` substring).
pub fn is_nit_title(title: &str) -> bool {
    title.to_lowercase().contains("nit")
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    title: String,
    user: UserPayload,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
}

#[derive(Serialize)]
struct PullQuery {
    state: &'static str,
}

/// Build an octocrab client, authenticated when a token is available.
pub fn build_client(token: Option<&str>) -> Result<Octocrab, GitHubError> {
    let builder = Octocrab::builder();
    let builder = match token {
        Some(token) => builder.personal_token(token.to_string()),
        None => builder,
    };
    builder.build().map_err(|e| GitHubError::Client(Box::new(e)))
}

/// Fetch the metadata of one pull request.
pub async fn fetch_release_record(
    client: &Octocrab,
    slug: &RepoSlug,
    number: u64,
) -> Result<ReleaseRecord, GitHubError> {
    let route = format!("/repos/{}/{}/pulls/{}", slug.owner, slug.name, number);
    let payload: PullRequestPayload = client
        .get(route, Some(&PullQuery { state: "closed" }))
        .await
        .map_err(|e| GitHubError::FetchPR {
            number,
            source: Box::new(e),
        })?;

    Ok(ReleaseRecord {
        number,
        title: payload.title,
        author: payload.user.login,
        url: payload.html_url,
    })
}

/// Fetch release records for the given PR numbers, one request at a time.
///
/// Failed fetches are logged and skipped. Nit PRs are dropped.
pub async fn fetch_release_records(
    client: &Octocrab,
    slug: &RepoSlug,
    numbers: &[u64],
) -> Vec<ReleaseRecord> {
    let mut records = Vec::with_capacity(numbers.len());

    for &number in numbers {
        match fetch_release_record(client, slug, number).await {
            Ok(record) if record.is_nit() => {
                debug!(number, title = %record.title, "Skipping nit PR");
            }
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping PR #{}: {}", number, e),
        }
    }

    records
}

/// Release records for PRs merged since the given release tag.
pub async fn merged_prs(
    client: &Octocrab,
    slug: &RepoSlug,
    repo: &Repository,
    since: &ReleaseTag,
) -> Result<Vec<ReleaseRecord>, GitError> {
    let summaries = merge_summaries(repo, Some(&since.name))?;
    let numbers = pr_numbers_from_merges(summaries.iter().map(String::as_str));
    info!("Found {} merged PRs since {}", numbers.len(), since.name);

    Ok(fetch_release_records(client, slug, &numbers).await)
}
