//! Paginated, rate-limit-aware GitHub REST API access.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  GitHubFetcher                   │
//! │  - run()          bounded concurrency + retries  │
//! │  - paginate()     page-counter pagination loop   │
//! │  - wait_for_rate_limit()                         │
//! └─────────────────────────────────────────────────┘
//!                        │
//!        ┌────────┬──────┴──────┬─────────────┐
//!        ▼        ▼             ▼             ▼
//! collaborators  issues   pull_requests   reviews / comments
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gradelib_core::Credentials;
//! use gradelib_github::{GitHubFetcher, issues};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let creds = Credentials::new("token");
//! let fetcher = GitHubFetcher::new(&creds)?;
//! let urls = vec!["https://github.com/owner/repo".to_string()];
//! let result = issues::fetch_issues(&fetcher, &urls, None, Some(5)).await?;
//! # Ok(())
//! # }
//! ```

pub mod collaborators;
pub mod comments;
pub mod error;
pub mod fetcher;
pub mod issues;
pub mod pull_requests;
pub mod reviews;
pub mod types;

/// Default GitHub host (public GitHub).
pub const DEFAULT_HOST: &str = "github.com";

pub use error::FetchError;
pub use fetcher::{parse_owner_repo, GitHubFetcher};
pub use types::{
    CodeReviewRecord, CollaboratorRecord, CommentRecord, CommentType, IssueRecord, ItemState,
    PullRequestRecord, ReviewState,
};

/// Re-exported octocrab so consumers don't need to depend on it directly.
pub use octocrab;
