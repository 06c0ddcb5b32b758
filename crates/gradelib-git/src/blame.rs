//! Parses `git blame --line-porcelain`, which (unlike plain
//! `--porcelain`) repeats the full attribution header for every line —
//! convenient here since it means each line can be parsed independently
//! without carrying state from a prior commit group.

use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use tokio::sync::Semaphore;

use crate::error::GitError;
use crate::process::run_git_blocking;
use crate::records::BlameLineRecord;

/// Bounded parallelism across file paths: blame is exec-plus-parse work,
/// so it belongs on the worker-pool lane sized to the CPU count, same as
/// the commit walker.
pub async fn bulk_blame(
    repo_path: &Path,
    paths: &[String],
) -> Vec<(String, Result<Vec<BlameLineRecord>, GitError>)> {
    let semaphore = Arc::new(Semaphore::new(num_cpus::get().max(1)));
    let mut handles = Vec::with_capacity(paths.len());

    for path in paths {
        let repo_path = repo_path.to_path_buf();
        let blame_path = path.clone();
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore open");
            tokio::task::spawn_blocking(move || blame_one(&repo_path, &blame_path))
                .await
                .unwrap_or_else(|e| Err(GitError::Spawn(e.to_string())))
        }));
    }

    let mut out = Vec::with_capacity(paths.len());
    for (path, handle) in paths.iter().zip(handles) {
        let result = handle
            .await
            .unwrap_or_else(|e| Err(GitError::Spawn(e.to_string())));
        out.push((path.clone(), result));
    }
    out
}

fn blame_one(repo_path: &Path, path: &str) -> Result<Vec<BlameLineRecord>, GitError> {
    if !repo_path.join(path).exists() {
        return Err(GitError::PathNotFound(path.to_string()));
    }

    let output = run_git_blocking(
        repo_path,
        &["blame", "--line-porcelain", "HEAD", "--", path],
    )?;

    parse_line_porcelain(&output)
}

fn parse_line_porcelain(output: &str) -> Result<Vec<BlameLineRecord>, GitError> {
    let header_re = Regex::new(r"^([0-9a-f]{40}) (\d+) (\d+)").expect("static regex");
    let mut records = Vec::new();

    let mut sha = String::new();
    let mut original_line_no = 0usize;
    let mut final_line_no = 0usize;
    let mut author_name = String::new();
    let mut author_email = String::new();

    for line in output.lines() {
        if let Some(caps) = header_re.captures(line) {
            sha = caps[1].to_string();
            original_line_no = caps[2].parse().unwrap_or(0);
            final_line_no = caps[3].parse().unwrap_or(0);
            continue;
        }
        if let Some(rest) = line.strip_prefix('\t') {
            records.push(BlameLineRecord {
                sha: sha.clone(),
                author_name: author_name.clone(),
                author_email: author_email.clone(),
                original_line_no,
                final_line_no,
                content: rest.to_string(),
            });
            continue;
        }
        if let Some(name) = line.strip_prefix("author ") {
            author_name = name.to_string();
        } else if let Some(email) = line.strip_prefix("author-mail ") {
            author_email = email.trim_matches(['<', '>']).to_string();
        }
    }

    records.sort_by_key(|r| r.final_line_no);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::run_git_blocking;

    fn init_repo(dir: &Path) {
        run_git_blocking(dir, &["init", "-q"]).unwrap();
        run_git_blocking(dir, &["config", "user.email", "t@example.test"]).unwrap();
        run_git_blocking(dir, &["config", "user.name", "Test"]).unwrap();
    }

    #[tokio::test]
    async fn blame_covers_every_line_contiguously() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        std::fs::write(dir.path().join("README.md"), "one\ntwo\nthree\n").unwrap();
        run_git_blocking(dir.path(), &["add", "."]).unwrap();
        run_git_blocking(dir.path(), &["commit", "-q", "-m", "init"]).unwrap();

        let results = bulk_blame(dir.path(), &["README.md".to_string()]).await;
        assert_eq!(results.len(), 1);
        let (path, result) = &results[0];
        assert_eq!(path, "README.md");
        let lines = result.as_ref().unwrap();
        assert_eq!(lines.len(), 3);
        let final_lines: Vec<usize> = lines.iter().map(|l| l.final_line_no).collect();
        assert_eq!(final_lines, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_path_yields_error_without_failing_batch() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        std::fs::write(dir.path().join("a.txt"), "x\n").unwrap();
        run_git_blocking(dir.path(), &["add", "."]).unwrap();
        run_git_blocking(dir.path(), &["commit", "-q", "-m", "init"]).unwrap();

        let results = bulk_blame(
            dir.path(),
            &["a.txt".to_string(), "missing.txt".to_string()],
        )
        .await;
        assert_eq!(results.len(), 2);
        let missing = results.iter().find(|(p, _)| p == "missing.txt").unwrap();
        assert!(missing.1.is_err());
        let present = results.iter().find(|(p, _)| p == "a.txt").unwrap();
        assert!(present.1.is_ok());
    }
}
