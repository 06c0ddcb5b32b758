//! Comment fetcher: the union of the issue-comment, commit-comment, and
//! review-comment (diff-level) endpoints, each tagged with its
//! [`CommentType`]. General PR discussion comments come back
//! from the same endpoint as plain issue comments (a PR *is* an issue on
//! GitHub), so this fetcher cross-references the repository's known PR
//! numbers — the same technique the reviews fetcher uses to enumerate
//! PRs — to split `Issue` from `PullRequest`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use crate::error::FetchError;
use crate::fetcher::{parse_owner_repo, GitHubFetcher};
use crate::types::{CommentRecord, CommentType};

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawIssueComment {
    id: u64,
    user: RawUser,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    body: String,
    issue_url: String,
}

#[derive(Debug, Deserialize)]
struct RawCommitComment {
    id: u64,
    user: RawUser,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    body: String,
    commit_id: String,
}

#[derive(Debug, Deserialize)]
struct RawReviewComment {
    id: u64,
    user: RawUser,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    body: String,
    pull_request_url: String,
}

#[derive(Debug, Deserialize)]
struct RawPullRequestNumber {
    number: u64,
}

fn trailing_number(url: &str) -> String {
    url.rsplit('/').next().unwrap_or_default().to_string()
}

/// If `comment_types` is `None`, fetches all four kinds; otherwise only
/// the requested ones.
pub async fn fetch_comments(
    fetcher: &GitHubFetcher,
    repo_urls: &[String],
    comment_types: Option<&[CommentType]>,
    max_pages: Option<u32>,
) -> HashMap<String, Result<Vec<CommentRecord>, FetchError>> {
    let wanted: HashSet<CommentType> = comment_types
        .map(|types| types.iter().copied().collect())
        .unwrap_or_else(|| {
            [
                CommentType::Issue,
                CommentType::Commit,
                CommentType::PullRequest,
                CommentType::ReviewComment,
            ]
            .into_iter()
            .collect()
        });

    let mut out = HashMap::with_capacity(repo_urls.len());
    for url in repo_urls {
        let result = fetch_one(fetcher, url, &wanted, max_pages).await;
        out.insert(url.clone(), result);
    }
    out
}

async fn fetch_one(
    fetcher: &GitHubFetcher,
    url: &str,
    wanted: &HashSet<CommentType>,
    max_pages: Option<u32>,
) -> Result<Vec<CommentRecord>, FetchError> {
    let (owner, repo) = parse_owner_repo(url)?;
    let mut records = Vec::new();

    if wanted.contains(&CommentType::Issue) || wanted.contains(&CommentType::PullRequest) {
        let pr_numbers = known_pull_request_numbers(fetcher, &owner, &repo, max_pages).await?;
        let raw: Vec<RawIssueComment> = fetcher
            .paginate(max_pages, |per_page, page_num| {
                let route = format!(
                    "/repos/{owner}/{repo}/issues/comments?per_page={per_page}&page={page_num}"
                );
                fetcher
                    .octocrab()
                    .get::<octocrab::Page<RawIssueComment>, _, ()>(route, None)
            })
            .await?;

        for c in raw {
            let number_str = trailing_number(&c.issue_url);
            let is_pr = number_str
                .parse::<u64>()
                .map(|n| pr_numbers.contains(&n))
                .unwrap_or(false);
            let comment_type = if is_pr {
                CommentType::PullRequest
            } else {
                CommentType::Issue
            };
            if wanted.contains(&comment_type) {
                records.push(CommentRecord {
                    id: c.id,
                    comment_type,
                    author_login: c.user.login,
                    created_at: c.created_at,
                    updated_at: c.updated_at,
                    body: c.body,
                    parent_ref: number_str,
                });
            }
        }
    }

    if wanted.contains(&CommentType::Commit) {
        let raw: Vec<RawCommitComment> = fetcher
            .paginate(max_pages, |per_page, page_num| {
                let route =
                    format!("/repos/{owner}/{repo}/comments?per_page={per_page}&page={page_num}");
                fetcher
                    .octocrab()
                    .get::<octocrab::Page<RawCommitComment>, _, ()>(route, None)
            })
            .await?;
        records.extend(raw.into_iter().map(|c| CommentRecord {
            id: c.id,
            comment_type: CommentType::Commit,
            author_login: c.user.login,
            created_at: c.created_at,
            updated_at: c.updated_at,
            body: c.body,
            parent_ref: c.commit_id,
        }));
    }

    if wanted.contains(&CommentType::ReviewComment) {
        let raw: Vec<RawReviewComment> = fetcher
            .paginate(max_pages, |per_page, page_num| {
                let route = format!(
                    "/repos/{owner}/{repo}/pulls/comments?per_page={per_page}&page={page_num}"
                );
                fetcher
                    .octocrab()
                    .get::<octocrab::Page<RawReviewComment>, _, ()>(route, None)
            })
            .await?;
        records.extend(raw.into_iter().map(|c| CommentRecord {
            id: c.id,
            comment_type: CommentType::ReviewComment,
            author_login: c.user.login,
            created_at: c.created_at,
            updated_at: c.updated_at,
            body: c.body,
            parent_ref: trailing_number(&c.pull_request_url),
        }));
    }

    Ok(records)
}

async fn known_pull_request_numbers(
    fetcher: &GitHubFetcher,
    owner: &str,
    repo: &str,
    max_pages: Option<u32>,
) -> Result<HashSet<u64>, FetchError> {
    let raw: Vec<RawPullRequestNumber> = fetcher
        .paginate(max_pages, |per_page, page_num| {
            let route =
                format!("/repos/{owner}/{repo}/pulls?state=all&per_page={per_page}&page={page_num}");
            fetcher
                .octocrab()
                .get::<octocrab::Page<RawPullRequestNumber>, _, ()>(route, None)
        })
        .await?;
    Ok(raw.into_iter().map(|p| p.number).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_trailing_number() {
        assert_eq!(
            trailing_number("https://api.github.com/repos/o/r/issues/42"),
            "42"
        );
    }
}
