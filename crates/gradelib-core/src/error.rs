//! Shared error taxonomy.
//!
//! Every subsystem crate defines its own `thiserror` enum scoped to its own
//! failure modes and converts into [`GradelibError`] at its boundary. Batch
//! operations never propagate a [`GradelibError`] for a single target's
//! failure; that gets flattened into the target's entry in a result map
//! instead. Only programmer errors and whole-operation setup failures
//! actually raise through an `async fn`'s `Result`.

use thiserror::Error;

/// The error taxonomy described by the error-handling design: one variant
/// per row of the kind/propagation table.
#[derive(Debug, Error)]
pub enum GradelibError {
    /// Caller misuse: runtime not initialized, invalid argument, manager
    /// used before registration. Never retried.
    #[error("programmer error: {0}")]
    Programmer(String),

    /// The service rejected the credentials outright (401-class).
    #[error("credential error: {0}")]
    Credential(String),

    /// The service understood the credentials but refused the operation
    /// (403-class, not rate-limit related).
    #[error("authorization error: {0}")]
    Authorization(String),

    /// Primary or secondary rate limit exhausted after the retry policy
    /// in the HTTP fetcher core gave up.
    #[error("rate limit exceeded: {0}")]
    RateLimit(String),

    /// Network-level failure that the retry policy exhausted: timeout,
    /// connection reset, 5xx.
    #[error("transient network error: {0}")]
    Transient(String),

    /// The target (repository, file path, PR number) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A `git` subprocess failed or produced output this crate could not
    /// parse.
    #[error("git error: {0}")]
    Git(String),

    /// Filesystem failure: scratch directory allocation, permissions.
    #[error("io error: {0}")]
    Io(String),
}

impl GradelibError {
    pub fn programmer(msg: impl Into<String>) -> Self {
        Self::Programmer(msg.into())
    }
}

impl From<std::io::Error> for GradelibError {
    fn from(err: std::io::Error) -> Self {
        GradelibError::Io(err.to_string())
    }
}

/// Convenience alias used throughout the core and its dependants.
pub type Result<T> = std::result::Result<T, GradelibError>;
