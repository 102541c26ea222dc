//! Publishing tasks: release pull requests and GitHub release uploads.

pub mod executor;
pub mod preflight;
pub mod pull_request;
pub mod release;

use chrono::{DateTime, FixedOffset};
use octocrab::Octocrab;

use crate::config::{ReleaseContext, Task};
use crate::error::PublishError;

use self::executor::CommandRunner;
use self::preflight::Toolchain;

pub use self::pull_request::{build_pr_body, create_pull_request};
pub use self::release::{find_artifacts, upload_to_release};

/// How a task finished. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The next version could not be inferred.
    NoVersion,
    /// No release tag exists to collect PRs from.
    NoReleaseTag,
    PullRequestOpened,
    /// Opening the PR failed twice, most likely because it already exists.
    PullRequestExists,
    /// The release tag already exists on the host.
    ReleaseExists,
    ReleasePublished { assets: usize },
}

/// Run one task with the given context.
pub async fn run_task(
    task: Task,
    ctx: &ReleaseContext,
    tools: &Toolchain,
    runner: &dyn CommandRunner,
    client: &Octocrab,
    now: DateTime<FixedOffset>,
) -> Result<TaskOutcome, PublishError> {
    match task {
        Task::CreatePullRequest => create_pull_request(ctx, tools, runner, client, now).await,
        Task::UploadToGithubRelease => upload_to_release(ctx, tools, runner).await,
    }
}
