//! The manager façade is the single entry point embedders use.
//! Everything else in this workspace exists to be dispatched from here.

pub mod manager;

pub use manager::Manager;

pub use gradelib_core::{
    setup_async, CloneState, CloneTaskView, Credentials, GradelibError, RepositoryRef,
};
pub use gradelib_git::{BlameLineRecord, BranchRecord, CommitRecord};
pub use gradelib_github::{
    CodeReviewRecord, CollaboratorRecord, CommentRecord, CommentType, IssueRecord, ItemState,
    PullRequestRecord, ReviewState,
};
