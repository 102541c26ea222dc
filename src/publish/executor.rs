//! External command execution for the publishing tasks.
//!
//! Commands are described as [`Invocation`]s and executed through a
//! [`CommandRunner`]. Read-only commands go through `probe`, anything that
//! changes the working tree, the remote, or the release host goes through
//! `run`. [`DryRunRunner`] suppresses the latter.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::CommandError;

/// A command line to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Short label used in logs and errors, e.g. "push".
    pub operation: &'static str,
    secret: Option<String>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, operation: &'static str) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            operation,
            secret: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Mask this value whenever the invocation is displayed.
    pub fn redact(mut self, secret: Option<&str>) -> Self {
        self.secret = secret.filter(|s| !s.is_empty()).map(String::from);
        self
    }

    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut line = self.program_name();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(char::is_whitespace) {
                line.push_str(&format!("{:?}", arg));
            } else {
                line.push_str(arg);
            }
        }
        if let Some(secret) = &self.secret {
            line = line.replace(secret.as_str(), "***");
        }
        f.write_str(&line)
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Output of a command that exited 0 without printing anything.
    pub fn empty_success() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes invocations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a read-only command.
    async fn probe(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError>;

    /// Run a command that changes state.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError>;
}

/// Runs commands with the system's process API in a fixed directory.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    workdir: PathBuf,
}

impl SystemRunner {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    async fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        debug!("Running: {}", invocation);

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                program: invocation.program_name(),
                source,
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn probe(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        self.execute(invocation).await
    }

    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        self.execute(invocation).await
    }
}

/// Wraps a runner so that state-changing commands are only logged.
///
/// Suppressed commands report success with empty output.
#[derive(Debug, Clone)]
pub struct DryRunRunner<R> {
    inner: R,
}

impl<R> DryRunRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: CommandRunner> CommandRunner for DryRunRunner<R> {
    async fn probe(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        self.inner.probe(invocation).await
    }

    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        info!("[dry-run] {}", invocation);
        Ok(CommandOutput::empty_success())
    }
}

/// Run a state-changing command and turn a non-zero exit into an error.
pub async fn run_checked(
    runner: &dyn CommandRunner,
    invocation: &Invocation,
) -> Result<CommandOutput, CommandError> {
    let output = runner.run(invocation).await?;
    if !output.success() {
        return Err(CommandError::Failed {
            program: invocation.program_name(),
            operation: invocation.operation.to_string(),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}
