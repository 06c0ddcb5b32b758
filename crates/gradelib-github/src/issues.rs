//! Issues fetcher. Includes pull requests by default (tagged via
//! `is_pull_request`), since that's what GitHub's issues endpoint
//! returns — see [`crate::types::IssueRecord`] for how to tell them apart.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::FetchError;
use crate::fetcher::{parse_owner_repo, GitHubFetcher};
use crate::types::{ItemState, IssueRecord};

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    id: u64,
    number: u64,
    title: String,
    state: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    user: RawUser,
    #[serde(default)]
    labels: Vec<RawLabel>,
    #[serde(default)]
    assignees: Vec<RawUser>,
    body: Option<String>,
    html_url: String,
    pull_request: Option<serde_json::Value>,
}

impl From<RawIssue> for IssueRecord {
    fn from(raw: RawIssue) -> Self {
        IssueRecord {
            id: raw.id,
            number: raw.number,
            title: raw.title,
            state: if raw.state == "closed" {
                ItemState::Closed
            } else {
                ItemState::Open
            },
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            closed_at: raw.closed_at,
            author_login: raw.user.login,
            author_id: raw.user.id,
            labels: raw.labels.into_iter().map(|l| l.name).collect(),
            assignees: raw.assignees.into_iter().map(|a| a.login).collect(),
            body: raw.body,
            html_url: raw.html_url,
            is_pull_request: raw.pull_request.is_some(),
        }
    }
}

/// `state` must be one of `"open"`, `"closed"`, `"all"`; anything else is
/// a programmer error (an invalid argument), not a per-target failure.
pub async fn fetch_issues(
    fetcher: &GitHubFetcher,
    repo_urls: &[String],
    state: Option<&str>,
    max_pages: Option<u32>,
) -> Result<HashMap<String, Result<Vec<IssueRecord>, FetchError>>, FetchError> {
    let state = validate_state(state)?;

    let mut out = HashMap::with_capacity(repo_urls.len());
    for url in repo_urls {
        let result = fetch_one(fetcher, url, state, max_pages).await;
        out.insert(url.clone(), result);
    }
    Ok(out)
}

fn validate_state(state: Option<&str>) -> Result<&str, FetchError> {
    match state.unwrap_or("all") {
        s @ ("open" | "closed" | "all") => Ok(s),
        other => Err(FetchError::InvalidArgument(format!(
            "invalid issue state {other:?}, expected one of open/closed/all"
        ))),
    }
}

async fn fetch_one(
    fetcher: &GitHubFetcher,
    url: &str,
    state: &str,
    max_pages: Option<u32>,
) -> Result<Vec<IssueRecord>, FetchError> {
    let (owner, repo) = parse_owner_repo(url)?;

    let raw: Vec<RawIssue> = fetcher
        .paginate(max_pages, |per_page, page_num| {
            let route = format!(
                "/repos/{owner}/{repo}/issues?state={state}&per_page={per_page}&page={page_num}"
            );
            fetcher.octocrab().get::<octocrab::Page<RawIssue>, _, ()>(route, None)
        })
        .await?;

    Ok(raw.into_iter().map(IssueRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradelib_core::Credentials;

    #[test]
    fn validate_state_accepts_known_values() {
        assert_eq!(validate_state(Some("open")).unwrap(), "open");
        assert_eq!(validate_state(None).unwrap(), "all");
    }

    #[test]
    fn validate_state_rejects_unknown_values() {
        assert!(validate_state(Some("archived")).is_err());
    }

    /// One target in a batch resolves, the other 404s — the batch call
    /// itself still succeeds, with the failure isolated to its own entry.
    #[tokio::test(flavor = "multi_thread")]
    async fn batch_fetch_isolates_a_per_target_failure() {
        let mut server = mockito::Server::new_async().await;
        let _good = server
            .mock("GET", "/repos/octocat/healthy/issues?state=all&per_page=100&page=1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id":1,"number":1,"title":"works","state":"open",
                "created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z",
                "closed_at":null,"user":{"login":"octocat","id":1},
                "labels":[],"assignees":[],"body":null,
                "html_url":"https://github.com/octocat/healthy/issues/1",
                "pull_request":null}]"#,
            )
            .create_async()
            .await;
        let _good_terminal_page = server
            .mock("GET", "/repos/octocat/healthy/issues?state=all&per_page=100&page=2")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/repos/octocat/gone/issues?state=all&per_page=100&page=1")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;

        let fetcher = GitHubFetcher::with_base_uri(&Credentials::new("t"), &server.url()).unwrap();
        let urls = vec![
            "https://github.com/octocat/healthy".to_string(),
            "https://github.com/octocat/gone".to_string(),
        ];

        let results = fetch_issues(&fetcher, &urls, None, None).await.unwrap();

        assert!(results["https://github.com/octocat/healthy"].is_ok());
        assert_eq!(
            results["https://github.com/octocat/healthy"]
                .as_ref()
                .unwrap()
                .len(),
            1
        );
        assert!(matches!(
            results["https://github.com/octocat/gone"],
            Err(FetchError::NotFound(_))
        ));
    }
}
