//! Pull request fetcher. The list endpoint omits
//! additions/deletions/changed_files/commits, so each PR is enriched with
//! a `GET /pulls/{number}` call, bounded by the same fetcher-wide
//! concurrency semaphore the list call itself uses.

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::FetchError;
use crate::fetcher::{parse_owner_repo, GitHubFetcher};
use crate::types::{ItemState, PullRequestRecord};

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
struct RawRef {
    #[serde(rename = "ref")]
    ref_name: String,
}

#[derive(Debug, Deserialize)]
struct RawPullRequestListItem {
    id: u64,
    number: u64,
    title: String,
    state: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    merged_at: Option<DateTime<Utc>>,
    user: RawUser,
    #[serde(default)]
    labels: Vec<RawLabel>,
    #[serde(default)]
    assignees: Vec<RawUser>,
    body: Option<String>,
    html_url: String,
    #[serde(default)]
    draft: bool,
    base: RawRef,
    head: RawRef,
}

#[derive(Debug, Deserialize)]
struct RawPullRequestDetail {
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    changed_files: u64,
    #[serde(default)]
    commits: u64,
    #[serde(default)]
    merged: bool,
}

/// `state` must be one of `"open"`, `"closed"`, `"all"`.
pub async fn fetch_pull_requests(
    fetcher: &GitHubFetcher,
    repo_urls: &[String],
    state: Option<&str>,
    max_pages: Option<u32>,
) -> Result<HashMap<String, Result<Vec<PullRequestRecord>, FetchError>>, FetchError> {
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
            "invalid pull request state {other:?}, expected one of open/closed/all"
        ))),
    }
}

async fn fetch_one(
    fetcher: &GitHubFetcher,
    url: &str,
    state: &str,
    max_pages: Option<u32>,
) -> Result<Vec<PullRequestRecord>, FetchError> {
    let (owner, repo) = parse_owner_repo(url)?;

    let list: Vec<RawPullRequestListItem> = fetcher
        .paginate(max_pages, |per_page, page_num| {
            let route = format!(
                "/repos/{owner}/{repo}/pulls?state={state}&per_page={per_page}&page={page_num}"
            );
            fetcher
                .octocrab()
                .get::<octocrab::Page<RawPullRequestListItem>, _, ()>(route, None)
        })
        .await?;

    let records = try_join_all(list.into_iter().map(|item| {
        let owner = owner.clone();
        let repo = repo.clone();
        async move {
            let detail = fetch_detail(fetcher, &owner, &repo, item.number).await?;
            Ok::<_, FetchError>(PullRequestRecord {
                id: item.id,
                number: item.number,
                title: item.title,
                state: if item.state == "closed" {
                    ItemState::Closed
                } else {
                    ItemState::Open
                },
                created_at: item.created_at,
                updated_at: item.updated_at,
                closed_at: item.closed_at,
                author_login: item.user.login,
                author_id: item.user.id,
                labels: item.labels.into_iter().map(|l| l.name).collect(),
                assignees: item.assignees.into_iter().map(|a| a.login).collect(),
                body: item.body,
                html_url: item.html_url,
                additions: detail.additions,
                deletions: detail.deletions,
                changed_files: detail.changed_files,
                commits: detail.commits,
                merged: detail.merged || item.merged_at.is_some(),
                is_draft: item.draft,
                base_ref: item.base.ref_name,
                head_ref: item.head.ref_name,
            })
        }
    }))
    .await?;

    Ok(records)
}

async fn fetch_detail(
    fetcher: &GitHubFetcher,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<RawPullRequestDetail, FetchError> {
    let route = format!("/repos/{owner}/{repo}/pulls/{number}");
    fetcher
        .run(|| fetcher.octocrab().get::<RawPullRequestDetail, _, ()>(&route, None))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_state_defaults_to_all() {
        assert_eq!(validate_state(None).unwrap(), "all");
    }

    #[test]
    fn validate_state_rejects_garbage() {
        assert!(validate_state(Some("merged")).is_err());
    }
}
