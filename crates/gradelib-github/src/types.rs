//! GitHub API data transfer objects.
//!
//! These types represent the data returned from the hosting service's
//! REST API, mapped from octocrab's models into the record shapes the
//! rest of this workspace consumes. Kept intentionally separate from
//! octocrab's own types to keep this crate's public surface stable
//! across octocrab upgrades, the same separation `gh-client::types`
//! draws.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorRecord {
    pub login: String,
    pub id: u64,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// Open/closed state shared by issues and pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Open,
    Closed,
}

impl ItemState {
    pub fn as_query_param(&self) -> &'static str {
        match self {
            ItemState::Open => "open",
            ItemState::Closed => "closed",
        }
    }
}

/// An issue from the hosting service's issues endpoint. GitHub's issues
/// API returns pull requests mingled with plain issues; `is_pull_request`
/// is how a caller tells them apart (issues are included by default —
/// filter on this field if you only want plain issues).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: ItemState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub author_login: String,
    pub author_id: u64,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub body: Option<String>,
    pub html_url: String,
    pub is_pull_request: bool,
}

/// A pull request, enriched with the additions/deletions/changed-files
/// detail only the single-PR endpoint returns (the list endpoint omits
/// them).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: ItemState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub author_login: String,
    pub author_id: u64,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub body: Option<String>,
    pub html_url: String,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
    pub commits: u64,
    pub merged: bool,
    pub is_draft: bool,
    pub base_ref: String,
    pub head_ref: String,
}

/// A review state as reported on a pull request review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeReviewRecord {
    pub id: u64,
    pub pull_request_number: u64,
    pub reviewer_login: String,
    pub state: ReviewState,
    pub submitted_at: Option<DateTime<Utc>>,
    pub body: Option<String>,
}

/// Which endpoint a [`CommentRecord`] was sourced from, and which parent
/// entity it attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CommentType {
    Issue,
    Commit,
    PullRequest,
    ReviewComment,
}

impl std::fmt::Display for CommentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CommentType::Issue => "issue",
            CommentType::Commit => "commit",
            CommentType::PullRequest => "pull_request",
            CommentType::ReviewComment => "review_comment",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: u64,
    pub comment_type: CommentType,
    pub author_login: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    /// Issue number, PR number, commit SHA, or review id, depending on
    /// `comment_type`.
    pub parent_ref: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_state_query_params() {
        assert_eq!(ItemState::Open.as_query_param(), "open");
        assert_eq!(ItemState::Closed.as_query_param(), "closed");
    }

    #[test]
    fn comment_type_serializes_snake_case() {
        let json = serde_json::to_string(&CommentType::ReviewComment).unwrap();
        assert_eq!(json, "\"review_comment\"");
    }

    #[test]
    fn issue_record_roundtrips() {
        let issue = IssueRecord {
            id: 1,
            number: 42,
            title: "bug".into(),
            state: ItemState::Open,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            closed_at: None,
            author_login: "octocat".into(),
            author_id: 7,
            labels: vec!["bug".into()],
            assignees: vec![],
            body: None,
            html_url: "https://github.com/o/r/issues/42".into(),
            is_pull_request: false,
        };
        let json = serde_json::to_string(&issue).unwrap();
        let back: IssueRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.number, 42);
        assert!(!back.is_pull_request);
    }
}
