//! Error types for releasekit modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to list tags: {0}")]
    ListTags(#[source] git2::Error),

    #[error("Could not determine current branch (detached HEAD?). Pass --current-branch")]
    DetachedHead,
}

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("Failed to build GitHub client: {0}")]
    Client(#[source] Box<octocrab::Error>),

    #[error("Failed to fetch PR #{number}: {source}")]
    FetchPR {
        number: u64,
        #[source]
        source: Box<octocrab::Error>,
    },

    #[error("Failed to parse repository URL '{0}'")]
    InvalidRepositoryUrl(String),

    #[error(
        "Repository is unknown: set --repository / RELEASEKIT_REPOSITORY or add a GitHub 'origin' remote"
    )]
    UnknownRepository,

    #[error("GitHub token not found: set GITHUB_TOKEN or GH_TOKEN")]
    MissingToken,
}

/// Errors from changelog operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Changelog file {} does not exist", .0.display())]
    MissingFile(PathBuf),

    #[error("Changelog file {} has no '{marker}' marker", path.display())]
    MissingMarker { path: PathBuf, marker: &'static str },

    #[error("Failed to read changelog {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write changelog {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from external command execution.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Required command '{0}' not found in PATH")]
    NotInstalled(&'static str),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} {operation} failed with {}: {stderr}",
             code.map_or("unknown status".to_string(), |c| format!("exit code {c}")))]
    Failed {
        program: String,
        operation: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Errors from the publishing tasks.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Invalid artifact pattern '{pattern}': {message}")]
    ArtifactPattern { pattern: String, message: String },
}
