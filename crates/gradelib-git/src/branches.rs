//! Enumerates local and remote-tracking refs with a single
//! `git for-each-ref`, then identifies the symbolic `HEAD` target via
//! `git symbolic-ref -q HEAD` (which fails, on purpose, for a detached
//! HEAD — that failure is not an error for this operation, it just means
//! no branch carries `is_head`).

use std::path::Path;

use crate::error::GitError;
use crate::process::{run_git, run_git_blocking, FIELD_SEP};
use crate::records::BranchRecord;

fn for_each_ref_format() -> String {
    [
        "%(refname)",
        "%(objectname)",
        "%(contents:subject)",
        "%(authorname)",
        "%(authoremail)",
        "%(authordate:unix)",
    ]
    .join(FIELD_SEP)
}

pub async fn list_branches(repo_path: &Path) -> Result<Vec<BranchRecord>, GitError> {
    let fmt_arg = format!("--format={}", for_each_ref_format());
    let output = run_git(
        repo_path,
        &["for-each-ref", &fmt_arg, "refs/heads", "refs/remotes"],
    )
    .await?;

    let head_target = resolve_head(repo_path).await;

    let mut records = Vec::new();
    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.splitn(6, FIELD_SEP);
        let refname = fields.next().unwrap_or_default();
        let objectname = fields.next().unwrap_or_default();
        let subject = fields.next().unwrap_or_default();
        let author_name = fields.next().unwrap_or_default();
        let author_email = fields.next().unwrap_or_default();
        let author_timestamp: i64 = fields.next().unwrap_or("0").trim().parse().unwrap_or(0);

        let is_remote = refname.starts_with("refs/remotes/");
        if is_remote && refname.ends_with("/HEAD") {
            continue;
        }

        let name = short_name(refname, is_remote);
        let is_head = !is_remote && head_target.as_deref() == Some(name.as_str());

        records.push(BranchRecord {
            name,
            is_remote,
            is_head,
            tip_sha: objectname.to_string(),
            tip_message: subject.to_string(),
            tip_author_name: author_name.to_string(),
            tip_author_email: author_email.trim_matches(['<', '>']).to_string(),
            tip_author_timestamp: author_timestamp,
        });
    }

    Ok(records)
}

fn short_name(refname: &str, is_remote: bool) -> String {
    if is_remote {
        refname
            .strip_prefix("refs/remotes/")
            .unwrap_or(refname)
            .to_string()
    } else {
        refname
            .strip_prefix("refs/heads/")
            .unwrap_or(refname)
            .to_string()
    }
}

/// Returns the short branch name HEAD symbolically points at, or `None`
/// for a detached HEAD (the command exits non-zero, which is expected,
/// not logged as an error).
async fn resolve_head(repo_path: &Path) -> Option<String> {
    let repo_path = repo_path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        run_git_blocking(&repo_path, &["symbolic-ref", "-q", "HEAD"])
            .ok()
            .map(|s| s.trim().to_string())
            .map(|s| s.strip_prefix("refs/heads/").unwrap_or(&s).to_string())
    })
    .await
    .unwrap_or(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::run_git_blocking;

    fn init_repo(dir: &Path) {
        run_git_blocking(dir, &["init", "-q", "-b", "main"]).unwrap();
        run_git_blocking(dir, &["config", "user.email", "t@example.test"]).unwrap();
        run_git_blocking(dir, &["config", "user.name", "Test"]).unwrap();
    }

    #[tokio::test]
    async fn head_branch_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        std::fs::write(dir.path().join("a.txt"), "x\n").unwrap();
        run_git_blocking(dir.path(), &["add", "."]).unwrap();
        run_git_blocking(dir.path(), &["commit", "-q", "-m", "init"]).unwrap();

        let branches = list_branches(dir.path()).await.unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].name, "main");
        assert!(branches[0].is_head);
        assert!(!branches[0].is_remote);
    }

    #[tokio::test]
    async fn empty_repo_has_no_branches() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let branches = list_branches(dir.path()).await.unwrap();
        assert!(branches.is_empty());
    }
}
