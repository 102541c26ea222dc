//! releasekit - release automation for package repositories.
//!
//! # Overview
//!
//! releasekit infers the version being released from `bump-version-*`
//! branches, collects the pull requests merged since the last `v*` tag,
//! writes Debian, RPM spec and Markdown changelog entries, opens the
//! release pull request, and uploads built packages to a GitHub release.

pub mod changelog;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod publish;
pub mod version;

// Re-export commonly used types
pub use changelog::{ChangelogEntry, ChangelogFiles, ChangelogFormat, Maintainer};
pub use config::{ReleaseContext, Task};
pub use error::{ChangelogError, CommandError, GitError, GitHubError, PublishError};
pub use git::ReleaseTag;
pub use github::{ReleaseRecord, RepoSlug};
pub use publish::TaskOutcome;
