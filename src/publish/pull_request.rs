//! The `create-pullrequest` task: update changelogs, commit, push, and open
//! a release pull request against the main branch.

use std::path::Path;

use chrono::{DateTime, FixedOffset};
use octocrab::Octocrab;
use tracing::{info, warn};

use crate::changelog::{ChangelogEntry, ChangelogFiles, update_changelogs};
use crate::config::{BOT_EMAIL, BOT_NAME, CHANGELOG_COMMIT_MESSAGE, ReleaseContext};
use crate::error::{CommandError, PublishError};
use crate::git::{head_message, last_release, open_repository};
use crate::github::{ReleaseRecord, merged_prs, push_url};
use crate::version::next_version;

use super::TaskOutcome;
use super::executor::{CommandRunner, Invocation, run_checked};
use super::preflight::Toolchain;

/// Run the pull request task.
pub async fn create_pull_request(
    ctx: &ReleaseContext,
    tools: &Toolchain,
    runner: &dyn CommandRunner,
    client: &Octocrab,
    now: DateTime<FixedOffset>,
) -> Result<TaskOutcome, PublishError> {
    let remote = push_url(&ctx.repository, ctx.token.as_deref(), ctx.dry_run)?;
    let git = tools.git.as_path();

    run_checked(
        runner,
        &Invocation::new(git, "checkout").args(["checkout", ctx.current_branch.as_str()]),
    )
    .await?;

    let repo = open_repository(&ctx.workdir)?;

    let Some(version) = next_version(ctx, &repo)? else {
        warn!(
            "Cannot infer the next version on branch '{}'; pass --next-version or use a bump-version-<version> branch",
            ctx.current_branch
        );
        return Ok(TaskOutcome::NoVersion);
    };

    let Some(current) = last_release(&repo)? else {
        warn!("No release tag (v<major>.<minor>[.<patch>]) found; cannot collect merged PRs");
        return Ok(TaskOutcome::NoReleaseTag);
    };

    info!("Preparing release {} (last release {})", version, current.name);

    let records = merged_prs(client, &ctx.repository, &repo, &current).await?;
    info!("{} PRs will be listed in the changelogs", records.len());

    let changed = if changelogs_already_updated(&head_message(&repo)?) {
        info!("Last commit already updated the changelogs; skipping changelog update");
        false
    } else {
        let entry = ChangelogEntry {
            package: ctx.package_name.clone(),
            version: version.clone(),
            maintainer: ctx.maintainer.clone(),
            timestamp: now,
            records: records.clone(),
        };
        let files = ChangelogFiles::for_package(&ctx.workdir, &ctx.package_name);
        update_changelogs(&files, &entry)?.any_changed()
    };

    let token = ctx.token.as_deref();

    if changed || working_tree_differs(runner, git).await? {
        commit_changelogs(runner, git).await?;
        push(runner, git, &remote, token, &ctx.current_branch).await;
    } else {
        info!("No changes to commit");
    }

    let body = build_pr_body(&version, &records);

    let pull = Invocation::new(git, "pull")
        .args(["pull", remote.as_str(), ctx.current_branch.as_str()])
        .redact(token);
    match runner.run(&pull).await {
        Ok(output) if output.success() => {}
        Ok(output) => warn!("git pull failed: {}", output.stderr.trim()),
        Err(e) => warn!("git pull failed: {}", e),
    }

    let open = Invocation::new(&tools.hub, "pull-request").args([
        "pull-request".to_string(),
        "-b".to_string(),
        format!("{}:{}", ctx.repository.owner, ctx.main_branch),
        "-h".to_string(),
        format!("{}:{}", ctx.repository.owner, ctx.current_branch),
        "-m".to_string(),
        body,
    ]);

    let reason = match runner.run(&open).await {
        Ok(output) if output.success() => {
            info!("Opened pull request: {}", output.stdout.trim());
            return Ok(TaskOutcome::PullRequestOpened);
        }
        Ok(output) => output.stderr.trim().to_string(),
        Err(e) => e.to_string(),
    };

    warn!(
        "Failed to open pull request ({}); pushing again and retrying once",
        reason
    );
    push(runner, git, &remote, token, &ctx.current_branch).await;

    let second = runner.run(&open).await?;
    if second.success() {
        info!("Opened pull request: {}", second.stdout.trim());
        return Ok(TaskOutcome::PullRequestOpened);
    }

    info!(
        "Pull request was not created, it probably already exists: {}",
        second.stderr.trim()
    );
    Ok(TaskOutcome::PullRequestExists)
}

/// Pull request body: a header line plus one bullet per record.
pub fn build_pr_body(version: &str, records: &[ReleaseRecord]) -> String {
    let mut body = format!("Release version {}\n\n", version);
    for record in records {
        body.push_str(&format!("- {} #{}\n", record.title, record.number));
    }
    body
}

/// Whether a commit message says the changelogs were already updated.
pub fn changelogs_already_updated(message: &str) -> bool {
    message.contains(CHANGELOG_COMMIT_MESSAGE)
}

/// `git diff --quiet HEAD`: exit 1 means the tree differs from HEAD.
async fn working_tree_differs(
    runner: &dyn CommandRunner,
    git: &Path,
) -> Result<bool, CommandError> {
    let diff = Invocation::new(git, "diff").args(["diff", "--quiet", "HEAD"]);
    let output = runner.probe(&diff).await?;

    match output.code {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        code => Err(CommandError::Failed {
            program: diff.program_name(),
            operation: diff.operation.to_string(),
            code,
            stderr: output.stderr.trim().to_string(),
        }),
    }
}

async fn commit_changelogs(runner: &dyn CommandRunner, git: &Path) -> Result<(), CommandError> {
    run_checked(
        runner,
        &Invocation::new(git, "config").args(["config", "user.name", BOT_NAME]),
    )
    .await?;
    run_checked(
        runner,
        &Invocation::new(git, "config").args(["config", "user.email", BOT_EMAIL]),
    )
    .await?;
    run_checked(
        runner,
        &Invocation::new(git, "commit").args(["commit", "-a", "-m", CHANGELOG_COMMIT_MESSAGE]),
    )
    .await?;
    info!("Committed changelog updates");
    Ok(())
}

/// Push the branch. Failures are logged; the pull request step retries.
async fn push(
    runner: &dyn CommandRunner,
    git: &Path,
    remote: &str,
    token: Option<&str>,
    branch: &str,
) {
    let invocation = Invocation::new(git, "push")
        .args(["push", remote, branch])
        .redact(token);

    match runner.run(&invocation).await {
        Ok(output) if output.success() => info!("Pushed {}", branch),
        Ok(output) => warn!("git push failed: {}", output.stderr.trim()),
        Err(e) => warn!("git push failed: {}", e),
    }
}
