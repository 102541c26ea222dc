//! Preflight checks: locate the external tools a task needs.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::config::Task;
use crate::error::CommandError;

/// Paths of the external programs, resolved once at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub git: PathBuf,
    pub hub: PathBuf,
    pub github_release: PathBuf,
}

impl Default for Toolchain {
    /// Bare program names, looked up in `PATH` on each spawn.
    fn default() -> Self {
        Self {
            git: PathBuf::from("git"),
            hub: PathBuf::from("hub"),
            github_release: PathBuf::from("github-release"),
        }
    }
}

impl Toolchain {
    /// Resolve the tools for a task with [`which`].
    ///
    /// `git` is always required. The publishing tool of the task is required
    /// unless this is a dry run, where it is never invoked.
    pub fn resolve(task: Task, dry_run: bool) -> Result<Self, CommandError> {
        Self::resolve_with(task, dry_run, |name| which::which(name).ok())
    }

    fn resolve_with<F>(task: Task, dry_run: bool, lookup: F) -> Result<Self, CommandError>
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let git = lookup("git").ok_or(CommandError::NotInstalled("git"))?;

        let publisher = match task {
            Task::CreatePullRequest => "hub",
            Task::UploadToGithubRelease => "github-release",
        };

        let resolve_optional = |name: &'static str| -> Result<PathBuf, CommandError> {
            match lookup(name) {
                Some(path) => {
                    debug!(tool = name, path = %path.display(), "Found tool");
                    Ok(path)
                }
                None if name != publisher => Ok(PathBuf::from(name)),
                None if dry_run => {
                    warn!("{} not found; continuing because this is a dry run", name);
                    Ok(PathBuf::from(name))
                }
                None => Err(CommandError::NotInstalled(name)),
            }
        };

        Ok(Self {
            git,
            hub: resolve_optional("hub")?,
            github_release: resolve_optional("github-release")?,
        })
    }
}
