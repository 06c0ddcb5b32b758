//! Local git subsystem error type. Converts into [`gradelib_core::GradelibError`]
//! at the manager boundary, following the same layered-error idiom as the
//! reference's `ParseError`/`CommentError` pair.

use gradelib_core::GradelibError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git executable not found on PATH")]
    ExecutableNotFound,

    #[error("git {subcommand} exited with status {status}: {stderr}")]
    CommandFailed {
        subcommand: String,
        status: i32,
        stderr: String,
    },

    #[error("failed to spawn git process: {0}")]
    Spawn(String),

    #[error("could not parse git output for {subcommand}: {detail}")]
    Parse { subcommand: String, detail: String },

    #[error("path not found in repository: {0}")]
    PathNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GitError> for GradelibError {
    fn from(err: GitError) -> Self {
        match err {
            GitError::PathNotFound(p) => GradelibError::NotFound(p),
            GitError::Io(e) => GradelibError::Io(e.to_string()),
            other => GradelibError::Git(other.to_string()),
        }
    }
}
