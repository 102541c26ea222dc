//! releasekit - CLI entry point.

use std::env;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use releasekit::Maintainer;
use releasekit::config::{
    BOT_EMAIL, BOT_NAME, DEFAULT_MAIN_BRANCH, ReleaseContext, Task, debug_flag_enabled,
    default_artifact_globs, default_package_name,
};
use releasekit::git::{configured_identity, current_branch, open_repository};
use releasekit::github::{RepoSlug, build_client, get_github_token};
use releasekit::publish::executor::{CommandRunner, DryRunRunner, SystemRunner};
use releasekit::publish::preflight::Toolchain;
use releasekit::publish::run_task;

/// Environment variable that turns on verbose logging.
const DEBUG_ENV_VAR: &str = "RELEASEKIT_DEBUG";

/// Prepare release pull requests and GitHub release uploads.
#[derive(Parser, Debug)]
#[command(name = "releasekit")]
#[command(about = "Prepare release pull requests and GitHub release uploads")]
#[command(version)]
struct Cli {
    /// Task to run
    #[arg(long, value_enum)]
    task: Task,

    /// Version to release (overrides branch-based inference)
    #[arg(long)]
    next_version: Option<String>,

    /// Package name used in changelogs and the RPM spec file name
    #[arg(long, env = "RELEASEKIT_PACKAGE_NAME")]
    package_name: Option<String>,

    /// Branch to release from (defaults to the checked out branch)
    #[arg(long)]
    current_branch: Option<String>,

    /// Branch release pull requests target
    #[arg(long, env = "RELEASEKIT_MAIN_BRANCH", default_value = DEFAULT_MAIN_BRANCH)]
    main_branch: String,

    /// GitHub repository as owner/name (defaults to the origin remote)
    #[arg(long, env = "RELEASEKIT_REPOSITORY")]
    repository: Option<RepoSlug>,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    /// Log git, hub and github-release commands that change state instead of running them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = cli.verbose || debug_flag_enabled(env::var(DEBUG_ENV_VAR).ok().as_deref());
    init_tracing(verbose);

    let task = cli.task;
    let tools = Toolchain::resolve(task, cli.dry_run).context("Missing required tool")?;
    let ctx = build_context(cli)?;

    if ctx.dry_run {
        info!("Dry run: state-changing commands will only be logged");
    }

    let system = SystemRunner::new(&ctx.workdir);
    let runner: Box<dyn CommandRunner> = if ctx.dry_run {
        Box::new(DryRunRunner::new(system))
    } else {
        Box::new(system)
    };

    let client = build_client(ctx.token.as_deref()).context("Failed to set up GitHub client")?;
    let now = Local::now().fixed_offset();

    let outcome = run_task(task, &ctx, &tools, runner.as_ref(), &client, now)
        .await
        .with_context(|| format!("Task {} failed", task))?;

    info!(?outcome, "Task {} finished", task);
    Ok(())
}

/// Resolve flags, environment and repository state into a run context.
fn build_context(cli: Cli) -> Result<ReleaseContext> {
    let cwd = env::current_dir().context("Cannot determine the working directory")?;
    let repo = open_repository(&cwd)
        .context("Not a git repository. Run releasekit from within the package repository.")?;
    let workdir = repo
        .workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("Bare repositories are not supported"))?;

    let current_branch = match cli.current_branch {
        Some(branch) => branch,
        None => current_branch(&repo).context("Failed to determine the current branch")?,
    };

    let package_name = cli
        .package_name
        .or_else(|| default_package_name(&workdir))
        .ok_or_else(|| anyhow!("Cannot determine the package name; pass --package-name"))?;

    let repository = match cli.repository {
        Some(slug) => slug,
        None => RepoSlug::from_origin(&repo).context("Failed to determine the GitHub repository")?,
    };

    let maintainer = configured_identity(&repo)
        .map(|(name, email)| Maintainer::new(name, email))
        .unwrap_or_else(|| Maintainer::new(BOT_NAME, BOT_EMAIL));

    let artifact_globs = default_artifact_globs(&workdir, dirs::home_dir().as_deref());

    Ok(ReleaseContext {
        workdir,
        package_name,
        current_branch,
        main_branch: cli.main_branch,
        next_version_override: cli.next_version,
        repository,
        token: get_github_token(),
        maintainer,
        artifact_globs,
        dry_run: cli.dry_run,
    })
}

/// Log to stderr. `RUST_LOG` overrides the verbosity flags.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "releasekit=debug"
    } else {
        "releasekit=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
