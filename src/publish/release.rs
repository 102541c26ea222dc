//! The `upload-to-github-release` task: create a pre-release and attach
//! the built packages to it.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::ReleaseContext;
use crate::error::PublishError;
use crate::git::open_repository;
use crate::version::next_version;

use super::TaskOutcome;
use super::executor::{CommandRunner, Invocation, run_checked};
use super::preflight::Toolchain;

/// Run the release upload task.
pub async fn upload_to_release(
    ctx: &ReleaseContext,
    tools: &Toolchain,
    runner: &dyn CommandRunner,
) -> Result<TaskOutcome, PublishError> {
    let repo = open_repository(&ctx.workdir)?;

    let Some(version) = next_version(ctx, &repo)? else {
        warn!(
            "Cannot infer the release version on branch '{}'; pass --next-version",
            ctx.current_branch
        );
        return Ok(TaskOutcome::NoVersion);
    };

    let tag = format!("v{}", version);
    let release = ReleaseCommand::new(tools, ctx, &tag);

    let create = runner
        .run(&release.invocation("release", "create release").args([
            "--name",
            tag.as_str(),
            "--pre-release",
        ]))
        .await?;
    if !create.success() {
        info!("Release {} already exists; nothing to upload", tag);
        return Ok(TaskOutcome::ReleaseExists);
    }
    info!("Created pre-release {}", tag);

    let artifacts = find_artifacts(&ctx.artifact_globs)?;
    if artifacts.is_empty() {
        warn!("No artifacts found in {:?}", ctx.artifact_globs);
    }

    let mut description = String::new();
    let mut uploaded = 0;

    for path in &artifacts {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            warn!("Skipping artifact with non UTF-8 name: {}", path.display());
            continue;
        };

        let upload = release.invocation("upload", "upload asset").args([
            "--name".to_string(),
            name.to_string(),
            "--file".to_string(),
            path.display().to_string(),
        ]);

        match runner.run(&upload).await? {
            output if output.success() => {
                info!("Uploaded {}", name);
                description.push_str(&format_asset_line(name));
                uploaded += 1;
            }
            output => warn!("Failed to upload {}: {}", name, output.stderr.trim()),
        }
    }

    run_checked(
        runner,
        &release.invocation("edit", "edit release").args([
            "--description",
            description.as_str(),
            "--pre-release",
        ]),
    )
    .await?;
    info!("Release {} lists {} uploaded files", tag, uploaded);

    Ok(TaskOutcome::ReleasePublished { assets: uploaded })
}

/// One line of the release description.
pub fn format_asset_line(name: &str) -> String {
    format!("- {}\n", name)
}

/// Expand artifact glob patterns into existing files.
///
/// Files are returned pattern by pattern, sorted within each pattern.
pub fn find_artifacts(patterns: &[String]) -> Result<Vec<PathBuf>, PublishError> {
    let mut artifacts = Vec::new();

    for pattern in patterns {
        let entries = glob::glob(pattern).map_err(|e| PublishError::ArtifactPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let mut matched: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Cannot read {}: {}", e.path().display(), e.error());
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        matched.sort();
        artifacts.extend(matched);
    }

    Ok(artifacts)
}

/// Shared `github-release` arguments for one release tag.
struct ReleaseCommand<'a> {
    program: &'a PathBuf,
    owner: &'a str,
    repo: &'a str,
    tag: &'a str,
}

impl<'a> ReleaseCommand<'a> {
    fn new(tools: &'a Toolchain, ctx: &'a ReleaseContext, tag: &'a str) -> Self {
        Self {
            program: &tools.github_release,
            owner: &ctx.repository.owner,
            repo: &ctx.repository.name,
            tag,
        }
    }

    fn invocation(&self, subcommand: &str, operation: &'static str) -> Invocation {
        Invocation::new(self.program, operation).args([
            subcommand, "--user", self.owner, "--repo", self.repo, "--tag", self.tag,
        ])
    }
}
