//! Collaborators fetcher.

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::FetchError;
use crate::fetcher::{parse_owner_repo, GitHubFetcher};
use crate::types::CollaboratorRecord;

#[derive(Debug, Deserialize)]
struct RawCollaborator {
    login: String,
    id: u64,
    avatar_url: Option<String>,
}

impl From<RawCollaborator> for CollaboratorRecord {
    fn from(raw: RawCollaborator) -> Self {
        CollaboratorRecord {
            login: raw.login,
            id: raw.id,
            // The collaborators list endpoint never returns the profile
            // name/email; that would require a separate per-user lookup
            // this fetcher does not perform.
            full_name: None,
            email: None,
            avatar_url: raw.avatar_url,
        }
    }
}

pub async fn fetch_collaborators(
    fetcher: &GitHubFetcher,
    repo_urls: &[String],
    max_pages: Option<u32>,
) -> HashMap<String, Result<Vec<CollaboratorRecord>, FetchError>> {
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
) -> Result<Vec<CollaboratorRecord>, FetchError> {
    let (owner, repo) = parse_owner_repo(url)?;

    let raw: Vec<RawCollaborator> = fetcher
        .paginate(max_pages, |per_page, page_num| {
            let route = format!(
                "/repos/{owner}/{repo}/collaborators?affiliation=all&per_page={per_page}&page={page_num}"
            );
            fetcher.octocrab().get::<octocrab::Page<RawCollaborator>, _, ()>(route, None)
        })
        .await?;

    Ok(raw.into_iter().map(CollaboratorRecord::from).collect())
}
