//! Local git analysis: cloning, walking commit history, bulk blame, and
//! branch inspection.
//!
//! Every engine shells out to the `git` executable on `PATH` rather than
//! linking libgit2 — the same external-tool-integration approach
//! GitPilot's parsers and the reference `ClientManager::TokenResolver`
//! (which shells out to the `gh` CLI) both take.

pub mod blame;
pub mod branches;
pub mod clone;
pub mod commit_walker;
pub mod credentials;
pub mod error;
pub mod process;
pub mod records;

pub use blame::bulk_blame;
pub use branches::list_branches;
pub use clone::{default_clone_concurrency, CloneEngine};
pub use commit_walker::walk_commits;
pub use error::GitError;
pub use records::{BlameLineRecord, BranchRecord, CommitRecord};
