//! Code review fetcher. Result is a nested map: repository URL → { PR
//! number → reviews }, matching the nested shape the Python reference's
//! `fetch_code_reviews` returns.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::FetchError;
use crate::fetcher::{parse_owner_repo, GitHubFetcher};
use crate::types::{CodeReviewRecord, ReviewState};

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawPullRequestNumber {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    id: u64,
    user: RawUser,
    state: String,
    submitted_at: Option<DateTime<Utc>>,
    body: Option<String>,
}

fn parse_review_state(s: &str) -> ReviewState {
    match s {
        "APPROVED" => ReviewState::Approved,
        "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
        "DISMISSED" => ReviewState::Dismissed,
        "PENDING" => ReviewState::Pending,
        _ => ReviewState::Commented,
    }
}

pub async fn fetch_code_reviews(
    fetcher: &GitHubFetcher,
    repo_urls: &[String],
    max_pages: Option<u32>,
) -> HashMap<String, Result<HashMap<u64, Vec<CodeReviewRecord>>, FetchError>> {
    let mut out = HashMap::with_capacity(repo_urls.len());
    for url in repo_urls {
        let result = fetch_one(fetcher, url, max_pages).await;
        out.insert(url.clone(), result);
    }
    out
}

async fn fetch_one(
    fetcher: &GitHubFetcher,
    url: &str,
    max_pages: Option<u32>,
) -> Result<HashMap<u64, Vec<CodeReviewRecord>>, FetchError> {
    let (owner, repo) = parse_owner_repo(url)?;

    let pr_numbers: Vec<u64> = fetcher
        .paginate(max_pages, |per_page, page_num| {
            let route = format!(
                "/repos/{owner}/{repo}/pulls?state=all&per_page={per_page}&page={page_num}"
            );
            fetcher
                .octocrab()
                .get::<octocrab::Page<RawPullRequestNumber>, _, ()>(route, None)
        })
        .await?
        .into_iter()
        .map(|p| p.number)
        .collect();

    let mut by_pr = HashMap::with_capacity(pr_numbers.len());
    for number in pr_numbers {
        let route = format!("/repos/{owner}/{repo}/pulls/{number}/reviews");
        let raw: Vec<RawReview> = fetcher
            .run(|| fetcher.octocrab().get::<Vec<RawReview>, _, ()>(&route, None))
            .await?;

        let reviews = raw
            .into_iter()
            .map(|r| CodeReviewRecord {
                id: r.id,
                pull_request_number: number,
                reviewer_login: r.user.login,
                state: parse_review_state(&r.state),
                submitted_at: r.submitted_at,
                body: r.body,
            })
            .collect();
        by_pr.insert(number, reviews);
    }

    Ok(by_pr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_states() {
        assert_eq!(parse_review_state("APPROVED"), ReviewState::Approved);
        assert_eq!(
            parse_review_state("CHANGES_REQUESTED"),
            ReviewState::ChangesRequested
        );
        assert_eq!(parse_review_state("COMMENTED"), ReviewState::Commented);
        assert_eq!(parse_review_state("unexpected"), ReviewState::Commented);
    }
}
