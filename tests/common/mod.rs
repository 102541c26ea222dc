//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use git2::{Oid, Repository, Signature};
use octocrab::Octocrab;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use releasekit::error::CommandError;
use releasekit::publish::executor::{CommandOutput, CommandRunner, Invocation};
use releasekit::{Maintainer, ReleaseContext, RepoSlug};

pub const PACKAGE: &str = "fluent-package";

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    fn write_and_stage(&self, file: &str, content: &str) -> Oid {
        std::fs::write(self.dir.path().join(file), content).expect("Failed to write test file");
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(file)).expect("Failed to add file");
        index.write().expect("Failed to write index");
        index.write_tree().expect("Failed to write tree")
    }

    /// Create a commit with the given message on HEAD. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = self.signature();
        let tree_id = self.write_and_stage("test.txt", message);
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Merge a pull request branch into HEAD with GitHub's merge message.
    pub fn merge_pr(&self, number: u64, branch: &str) -> Oid {
        let sig = self.signature();
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("merge_pr needs an existing commit");

        let tree_id = self.write_and_stage(&format!("pr-{}.txt", number), branch);
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let side_oid = self
            .repo
            .commit(None, &sig, &sig, &format!("Work on {}", branch), &tree, &[&head])
            .expect("Failed to create branch commit");
        let side = self.repo.find_commit(side_oid).expect("Failed to find branch commit");

        let message = format!("Merge pull request #{} from org/{}\n\n{}", number, branch, branch);
        self.repo
            .commit(Some("HEAD"), &sig, &sig, &message, &tree, &[&head, &side])
            .expect("Failed to create merge commit")
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &obj, false)
            .expect("Failed to create lightweight tag");
    }

    /// Create an annotated tag pointing to the given OID.
    pub fn tag_annotated(&self, name: &str, oid: Oid, message: &str) {
        let sig = self.signature();
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag(name, &obj, &sig, message, false)
            .expect("Failed to create annotated tag");
    }

    /// Write the three changelog files with their markers.
    pub fn write_changelogs(&self) {
        write_changelogs(self.path(), PACKAGE);
    }
}

/// Create `debian/changelog`, `rpm/<package>.spec` and `CHANGELOG.md`.
pub fn write_changelogs(root: &Path, package: &str) {
    std::fs::create_dir_all(root.join("debian")).expect("Failed to create debian dir");
    std::fs::create_dir_all(root.join("rpm")).expect("Failed to create rpm dir");

    std::fs::write(root.join("debian/changelog"), debian_fixture(package))
        .expect("Failed to write debian changelog");
    std::fs::write(root.join(format!("rpm/{}.spec", package)), rpm_fixture(package))
        .expect("Failed to write rpm spec");
    std::fs::write(root.join("CHANGELOG.md"), MARKDOWN_FIXTURE)
        .expect("Failed to write CHANGELOG.md");
}

pub fn debian_fixture(package: &str) -> String {
    format!(
        "{} (1.0.0-1) stable; urgency=low\n\n  * Initial release (by carol)\n    <https://github.com/org/pkg/pull/1>\n\n -- Test User <test@example.com>  Mon, 05 Jan 2026 10:00:00 +0000\n",
        package
    )
}

pub fn rpm_fixture(package: &str) -> String {
    format!(
        "Name: {}\nVersion: 1.0.0\nRelease: 1\n\n%description\nA package.\n\n%changelog\n* Mon Jan 05 2026 test@example.com - 1.0.0-1\n- Initial release (by carol)\n",
        package
    )
}

pub const MARKDOWN_FIXTURE: &str =
    "# Changelog\n\n## 1.0.0 (2026-01-05)\n\n* Initial release #1 (carol)\n";

/// Fixed rendering time for changelog entries.
pub fn fixed_now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 18, 9, 30, 0)
        .unwrap()
}

/// A run context rooted at `workdir`.
pub fn context(workdir: &Path, branch: &str) -> ReleaseContext {
    ReleaseContext {
        workdir: workdir.to_path_buf(),
        package_name: PACKAGE.to_string(),
        current_branch: branch.to_string(),
        main_branch: "main".to_string(),
        next_version_override: None,
        repository: RepoSlug::new("org", "pkg"),
        token: Some("test-token".to_string()),
        maintainer: Maintainer::new("Release Bot", "bot@example.com"),
        artifact_globs: Vec::new(),
        dry_run: false,
    }
}

/// Octocrab client pointing to a mock server.
pub fn mock_client(server: &MockServer) -> Octocrab {
    Octocrab::builder()
        .base_uri(server.uri())
        .expect("Failed to set base URI")
        .build()
        .expect("Failed to build octocrab")
}

/// Minimal pull request payload with the fields releasekit reads.
pub fn pr_json(number: u64, title: &str, login: &str) -> Value {
    json!({
        "number": number,
        "state": "closed",
        "title": title,
        "user": { "login": login, "id": 100 },
        "html_url": format!("https://github.com/org/pkg/pull/{}", number),
    })
}

/// Serve `GET /repos/org/pkg/pulls/<number>?state=closed`.
pub async fn mount_pr(server: &MockServer, number: u64, title: &str, login: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/org/pkg/pulls/{}", number)))
        .and(query_param("state", "closed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pr_json(number, title, login)))
        .mount(server)
        .await;
}

type CommandResult = Result<CommandOutput, CommandError>;
type Responder = Arc<dyn Fn(&Invocation) -> CommandResult + Send + Sync>;

/// Command runner that records invocations instead of spawning processes.
///
/// Clones share their records, so a clone can be handed to a wrapper.
#[derive(Clone)]
pub struct RecordingRunner {
    probes: Arc<Mutex<Vec<Invocation>>>,
    runs: Arc<Mutex<Vec<Invocation>>>,
    responder: Responder,
}

impl RecordingRunner {
    /// Every command succeeds with empty output.
    pub fn succeeding() -> Self {
        Self::with_responder(|_| CommandOutput::empty_success())
    }

    pub fn with_responder(
        responder: impl Fn(&Invocation) -> CommandOutput + Send + Sync + 'static,
    ) -> Self {
        Self::with_fallible_responder(move |inv| Ok(responder(inv)))
    }

    /// Like [`RecordingRunner::with_responder`], but commands may fail to spawn.
    pub fn with_fallible_responder(
        responder: impl Fn(&Invocation) -> CommandResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            probes: Arc::default(),
            runs: Arc::default(),
            responder: Arc::new(responder),
        }
    }

    pub fn probes(&self) -> Vec<Invocation> {
        self.probes.lock().unwrap().clone()
    }

    pub fn runs(&self) -> Vec<Invocation> {
        self.runs.lock().unwrap().clone()
    }

    /// Argument lists of the state-changing commands, in order.
    pub fn run_args(&self) -> Vec<Vec<String>> {
        self.runs().into_iter().map(|inv| inv.args).collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn probe(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        self.probes.lock().unwrap().push(invocation.clone());
        (self.responder)(invocation)
    }

    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        self.runs.lock().unwrap().push(invocation.clone());
        (self.responder)(invocation)
    }
}

/// A failed command with the given stderr.
pub fn failure(stderr: &str) -> CommandOutput {
    CommandOutput {
        code: Some(1),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}
