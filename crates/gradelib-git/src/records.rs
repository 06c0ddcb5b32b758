//! Typed records produced by the local git analyzers.
//!
//! Field shapes follow the same plain-struct-plus-derive convention as
//! `gh-client::types`, adapted from the parsing fields GitPilot's
//! `Commit`/`BlameLine`/`Branch` models already extract from `git`'s
//! porcelain output.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub repository: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub author_timestamp: i64,
    pub author_offset_minutes: i32,
    pub committer_name: String,
    pub committer_email: String,
    pub committer_timestamp: i64,
    pub committer_offset_minutes: i32,
    pub additions: u64,
    pub deletions: u64,
    pub is_merge: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlameLineRecord {
    pub sha: String,
    pub author_name: String,
    pub author_email: String,
    pub original_line_no: usize,
    pub final_line_no: usize,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchRecord {
    pub name: String,
    pub is_remote: bool,
    pub is_head: bool,
    pub tip_sha: String,
    pub tip_message: String,
    pub tip_author_name: String,
    pub tip_author_email: String,
    pub tip_author_timestamp: i64,
}
