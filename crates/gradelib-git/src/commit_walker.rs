//! Walks every commit reachable from any ref via `git rev-list --all`,
//! shards the SHA list across `spawn_blocking` workers (one per CPU, the
//! same CPU-bound worker-pool lane the blame engine uses), and extracts
//! per-commit metadata with a delimiter-based `git show --format=...`
//! invocation in the style of GitPilot's `Commit::from_show_format`
//! marker-line parsing, generalized to a single-pass field split instead
//! of per-line markers.

use std::path::{Path, PathBuf};

use crate::error::GitError;
use crate::process::{run_git, run_git_blocking, FIELD_SEP};
use crate::records::CommitRecord;

/// Record separator placed right after the format string's last field so
/// the numstat section that follows (appended by `--numstat`) can be
/// located unambiguously even though the commit message itself may
/// contain embedded newlines.
const RECORD_SEP: &str = "\x1e";

fn show_format() -> String {
    [
        "%H", "%P", "%an", "%ae", "%ad", "%cn", "%ce", "%cd", "%B",
    ]
    .join(FIELD_SEP)
        + "%x1e"
}

pub async fn walk_commits(repo_path: &Path, repository_name: &str) -> Result<Vec<CommitRecord>, GitError> {
    let rev_list = run_git(repo_path, &["rev-list", "--all"]).await?;
    let shas: Vec<String> = rev_list
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    if shas.is_empty() {
        return Ok(Vec::new());
    }

    let shard_count = std::cmp::min(shas.len(), num_cpus::get().max(1));
    let mut shards: Vec<Vec<String>> = vec![Vec::new(); shard_count];
    for (i, sha) in shas.into_iter().enumerate() {
        shards[i % shard_count].push(sha);
    }

    let mut handles = Vec::with_capacity(shard_count);
    for shard in shards {
        let repo_path = repo_path.to_path_buf();
        let repository_name = repository_name.to_string();
        handles.push(tokio::task::spawn_blocking(move || {
            walk_shard(&repo_path, &repository_name, &shard)
        }));
    }

    let mut records = Vec::new();
    for handle in handles {
        let shard_records = handle
            .await
            .map_err(|e| GitError::Spawn(e.to_string()))??;
        records.extend(shard_records);
    }

    records.sort_by(|a: &CommitRecord, b: &CommitRecord| {
        b.author_timestamp
            .cmp(&a.author_timestamp)
            .then_with(|| a.sha.cmp(&b.sha))
    });

    Ok(records)
}

fn walk_shard(
    repo_path: &PathBuf,
    repository_name: &str,
    shas: &[String],
) -> Result<Vec<CommitRecord>, GitError> {
    shas.iter()
        .map(|sha| show_one(repo_path, repository_name, sha))
        .collect()
}

fn show_one(repo_path: &Path, repository_name: &str, sha: &str) -> Result<CommitRecord, GitError> {
    let fmt_arg = format!("--format={}", show_format());
    let parents = run_git_blocking(repo_path, &["show", "--no-patch", "--format=%P", sha])?;
    let parent_count = parents.split_whitespace().count();
    let is_merge = parent_count >= 2;

    let args: Vec<&str> = if is_merge {
        vec!["show", "--numstat", "--cc", "--date=raw", &fmt_arg, sha]
    } else {
        vec!["show", "--numstat", "--date=raw", &fmt_arg, sha]
    };
    let output = run_git_blocking(repo_path, &args)?;

    let rs_idx = output.find(RECORD_SEP).ok_or_else(|| GitError::Parse {
        subcommand: "show".to_string(),
        detail: format!("missing record separator for {sha}"),
    })?;
    let (header, rest) = output.split_at(rs_idx);
    let numstat_section = &rest[RECORD_SEP.len()..];

    let mut fields = header.splitn(9, FIELD_SEP);
    let mut next = || -> Result<&str, GitError> {
        fields.next().ok_or_else(|| GitError::Parse {
            subcommand: "show".to_string(),
            detail: format!("truncated header for {sha}"),
        })
    };

    let sha_field = next()?.to_string();
    let _parents_field = next()?;
    let author_name = next()?.to_string();
    let author_email = next()?.to_string();
    let (author_timestamp, author_offset_minutes) = parse_raw_date(next()?)?;
    let committer_name = next()?.to_string();
    let committer_email = next()?.to_string();
    let (committer_timestamp, committer_offset_minutes) = parse_raw_date(next()?)?;
    let message = next()?.trim_end_matches('\n').to_string();

    let (additions, deletions) = sum_numstat(numstat_section);

    Ok(CommitRecord {
        sha: sha_field,
        repository: repository_name.to_string(),
        message,
        author_name,
        author_email,
        author_timestamp,
        author_offset_minutes,
        committer_name,
        committer_email,
        committer_timestamp,
        committer_offset_minutes,
        additions,
        deletions,
        is_merge,
    })
}

/// Parses `git --date=raw` output (`"<unix-ts> <+HHMM|-HHMM>"`) into a
/// `(timestamp, offset_minutes)` pair. `%ad`/`%cd` only emit this shape
/// when `--date=raw` is passed, which `show_one` always does.
fn parse_raw_date(raw: &str) -> Result<(i64, i32), GitError> {
    let mut parts = raw.split_whitespace();
    let ts = parts
        .next()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| GitError::Parse {
            subcommand: "show".to_string(),
            detail: format!("bad timestamp in {raw:?}"),
        })?;
    let offset = parts.next().map(parse_offset).unwrap_or(0);
    Ok((ts, offset))
}

fn parse_offset(s: &str) -> i32 {
    if s.len() != 5 {
        return 0;
    }
    let sign = if s.starts_with('-') { -1 } else { 1 };
    let hh: i32 = s[1..3].parse().unwrap_or(0);
    let mm: i32 = s[3..5].parse().unwrap_or(0);
    sign * (hh * 60 + mm)
}

/// Sums `git --numstat` lines (`"<added>\t<deleted>\t<path>"`), treating
/// git's `-\t-\t<path>` binary-file marker as zero/zero.
fn sum_numstat(section: &str) -> (u64, u64) {
    let mut additions = 0u64;
    let mut deletions = 0u64;
    for line in section.lines() {
        let mut cols = line.split('\t');
        let a = cols.next().unwrap_or("");
        let d = cols.next().unwrap_or("");
        additions += a.parse::<u64>().unwrap_or(0);
        deletions += d.parse::<u64>().unwrap_or(0);
    }
    (additions, deletions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_repo(dir: &Path) {
        run_git_blocking(dir, &["init", "-q"]).unwrap();
        run_git_blocking(dir, &["config", "user.email", "t@example.test"]).unwrap();
        run_git_blocking(dir, &["config", "user.name", "Test"]).unwrap();
    }

    #[test]
    fn offset_parsing() {
        assert_eq!(parse_offset("+0200"), 120);
        assert_eq!(parse_offset("-0530"), -330);
        assert_eq!(parse_offset("+0000"), 0);
    }

    #[test]
    fn numstat_sums_and_treats_binary_as_zero() {
        let section = "3\t1\tREADME.md\n-\t-\timage.png\n";
        assert_eq!(sum_numstat(section), (3, 1));
    }

    #[tokio::test]
    async fn single_commit_repo_produces_one_record() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        std::fs::write(dir.path().join("README.md"), "one\ntwo\nthree\n").unwrap();
        run_git_blocking(dir.path(), &["add", "."]).unwrap();
        run_git_blocking(dir.path(), &["commit", "-q", "-m", "init"]).unwrap();

        let records = walk_commits(dir.path(), "test-repo").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].additions, 3);
        assert_eq!(records[0].deletions, 0);
        assert!(!records[0].is_merge);
        assert_eq!(records[0].repository, "test-repo");
    }

    #[tokio::test]
    async fn empty_repo_produces_no_records() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let records = walk_commits(dir.path(), "empty").await.unwrap();
        assert!(records.is_empty());
    }
}
