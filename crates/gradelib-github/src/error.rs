//! HTTP Fetcher Core error type. Mirrors the same "extract the useful
//! message, don't just `{:?}` the whole octocrab error" approach the
//! reference `octocrab_client::format_octocrab_error` takes, but typed
//! instead of flattened straight to `anyhow`.

use gradelib_core::GradelibError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("credential error: {0}")]
    Credential(String),

    #[error("authorization error: {0}")]
    Authorization(String),

    #[error("rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("transient network error: {0}")]
    Transient(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid repository url: {0}")]
    InvalidUrl(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<FetchError> for GradelibError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Credential(m) => GradelibError::Credential(m),
            FetchError::Authorization(m) => GradelibError::Authorization(m),
            FetchError::RateLimit(m) => GradelibError::RateLimit(m),
            FetchError::Transient(m) => GradelibError::Transient(m),
            FetchError::NotFound(m) => GradelibError::NotFound(m),
            FetchError::InvalidUrl(m) | FetchError::InvalidArgument(m) => {
                GradelibError::Programmer(m)
            }
        }
    }
}

/// Classifies an octocrab error the same way `format_octocrab_error`
/// extracts a usable message, but keeping each failure mode as its own
/// typed variant instead of collapsing everything to a string immediately.
pub fn classify_octocrab_error(err: octocrab::Error) -> FetchError {
    match &err {
        octocrab::Error::GitHub { source, .. } => {
            let msg = source.message.clone();
            let lower = msg.to_lowercase();
            if lower.contains("rate limit") {
                FetchError::RateLimit(msg)
            } else if lower.contains("bad credentials") || lower.contains("requires authentication")
            {
                FetchError::Credential(msg)
            } else if lower.contains("not found") {
                // GitHub's issues/pulls/collaborators endpoints return
                // this message exclusively on a 404 response.
                FetchError::NotFound(format!("{msg} (404)"))
            } else {
                FetchError::Authorization(msg)
            }
        }
        other => FetchError::Transient(other.to_string()),
    }
}
