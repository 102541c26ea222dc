//! Integration tests for merged PR aggregation with a mocked GitHub API.

mod common;

use common::{TestRepo, mock_client, mount_pr};
use releasekit::error::GitHubError;
use releasekit::git::last_release;
use releasekit::github::{RepoSlug, fetch_release_record, fetch_release_records, merged_prs};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn slug() -> RepoSlug {
    RepoSlug::new("org", "pkg")
}

#[tokio::test]
async fn test_fetch_release_record() {
    let server = MockServer::start().await;
    mount_pr(&server, 42, "Add S3 output", "alice").await;
    let client = mock_client(&server);

    let record = fetch_release_record(&client, &slug(), 42).await.unwrap();
    assert_eq!(record.number, 42);
    assert_eq!(record.title, "Add S3 output");
    assert_eq!(record.author, "alice");
    assert_eq!(record.url, "https://github.com/org/pkg/pull/42");
}

#[tokio::test]
async fn test_fetch_release_record_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/org/pkg/pulls/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&server)
        .await;
    let client = mock_client(&server);

    let result = fetch_release_record(&client, &slug(), 404).await;
    assert!(matches!(result, Err(GitHubError::FetchPR { number: 404, .. })));
}

#[tokio::test]
async fn test_failed_and_nit_prs_are_skipped() {
    let server = MockServer::start().await;
    mount_pr(&server, 1, "Add buffer plugin", "alice").await;
    mount_pr(&server, 2, "nit: fix typo in README", "bob").await;
    mount_pr(&server, 4, "Fix input encoding", "carol").await;
    Mock::given(method("GET"))
        .and(path("/repos/org/pkg/pulls/5"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    let client = mock_client(&server);

    // #3 has no mock and answers 404.
    let records = fetch_release_records(&client, &slug(), &[1, 2, 3, 4, 5]).await;

    let numbers: Vec<u64> = records.iter().map(|r| r.number).collect();
    assert_eq!(numbers, vec![1, 4]);
    assert_eq!(records[1].author, "carol");
}

#[tokio::test]
async fn test_merged_prs_since_last_release() {
    let test_repo = TestRepo::new();
    test_repo.commit("Initial commit");
    test_repo.merge_pr(1, "already-released");
    let released = test_repo.commit("Release 1.0.0");
    test_repo.tag_lightweight("v1.0.0", released);
    test_repo.merge_pr(7, "add-output");
    test_repo.merge_pr(3, "fix-input");

    let server = MockServer::start().await;
    mount_pr(&server, 1, "Old change", "zed").await;
    mount_pr(&server, 3, "Fix input", "bob").await;
    mount_pr(&server, 7, "Add output", "alice").await;
    let client = mock_client(&server);

    let since = last_release(&test_repo.repo).unwrap().unwrap();
    let records = merged_prs(&client, &slug(), &test_repo.repo, &since).await.unwrap();

    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Fix input", "Add output"]);
}
