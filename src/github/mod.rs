//! GitHub integration: repository slugs, auth, merged PR metadata.

pub mod auth;
pub mod prs;
pub mod repo;

pub use auth::{get_github_token, push_url};
pub use prs::{ReleaseRecord, build_client, fetch_release_record, fetch_release_records, merged_prs};
pub use repo::{RepoSlug, parse_github_remote};
