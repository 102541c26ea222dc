//! Run configuration resolved once at process start.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::changelog::Maintainer;
use crate::github::RepoSlug;

/// Identity used for changelog commits.
pub const BOT_NAME: &str = "releasekit-bot";
pub const BOT_EMAIL: &str = "releasekit-bot@users.noreply.github.com";

/// Commit message of the changelog commit. Also used to detect that
/// changelogs were already updated on the branch.
pub const CHANGELOG_COMMIT_MESSAGE: &str = "update changelogs";

/// Branch used when neither flag nor environment names one.
pub const DEFAULT_MAIN_BRANCH: &str = "main";

/// The release task to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Task {
    /// Update changelogs and open a release pull request
    #[value(name = "create-pullrequest")]
    CreatePullRequest,
    /// Create a GitHub pre-release and upload built packages
    #[value(name = "upload-to-github-release")]
    UploadToGithubRelease,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatePullRequest => write!(f, "create-pullrequest"),
            Self::UploadToGithubRelease => write!(f, "upload-to-github-release"),
        }
    }
}

/// Everything a task needs to know about the run, derived from CLI flags
/// and the environment.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub workdir: PathBuf,
    pub package_name: String,
    pub current_branch: String,
    pub main_branch: String,
    pub next_version_override: Option<String>,
    pub repository: RepoSlug,
    pub token: Option<String>,
    pub maintainer: Maintainer,
    pub artifact_globs: Vec<String>,
    pub dry_run: bool,
}

impl ReleaseContext {
    pub fn is_main_branch(&self) -> bool {
        self.current_branch == self.main_branch
    }
}

/// Default package name: the name of the working directory.
pub fn default_package_name(workdir: &Path) -> Option<String> {
    workdir
        .file_name()
        .and_then(|name| name.to_str())
        .map(String::from)
}

/// Default locations of built packages.
///
/// - RPMs from `rpmbuild` under the home directory
/// - `.deb` files, which `dpkg-buildpackage` writes to the parent directory
/// - zip archives in the `snapshot` directory
pub fn default_artifact_globs(workdir: &Path, home: Option<&Path>) -> Vec<String> {
    let mut globs = Vec::new();
    if let Some(home) = home {
        globs.push(home.join("rpmbuild/RPMS/*/*.rpm").display().to_string());
    }
    let parent = workdir.parent().unwrap_or(workdir);
    globs.push(parent.join("*.deb").display().to_string());
    globs.push(workdir.join("snapshot/*.zip").display().to_string());
    globs
}

/// Whether a debug-flag environment value enables verbose logging.
pub fn debug_flag_enabled(value: Option<&str>) -> bool {
    matches!(
        value.map(str::trim),
        Some(v) if !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_package_name_from_workdir() {
        assert_eq!(
            default_package_name(Path::new("/src/fluent-package")),
            Some("fluent-package".to_string())
        );
    }

    #[test]
    fn test_default_artifact_globs() {
        let globs = default_artifact_globs(Path::new("/build/pkg"), Some(Path::new("/home/ci")));
        assert_eq!(
            globs,
            vec![
                "/home/ci/rpmbuild/RPMS/*/*.rpm".to_string(),
                "/build/*.deb".to_string(),
                "/build/pkg/snapshot/*.zip".to_string(),
            ]
        );
    }

    #[test]
    fn test_default_artifact_globs_without_home() {
        let globs = default_artifact_globs(Path::new("/build/pkg"), None);
        assert_eq!(globs.len(), 2);
    }

    #[test]
    fn test_debug_flag_values() {
        assert!(debug_flag_enabled(Some("1")));
        assert!(debug_flag_enabled(Some("yes")));
        assert!(!debug_flag_enabled(Some("0")));
        assert!(!debug_flag_enabled(Some("false")));
        assert!(!debug_flag_enabled(Some("")));
        assert!(!debug_flag_enabled(None));
    }

    #[test]
    fn test_task_display_matches_cli_value() {
        assert_eq!(Task::CreatePullRequest.to_string(), "create-pullrequest");
        assert_eq!(Task::UploadToGithubRelease.to_string(), "upload-to-github-release");
    }
}
