//! Clone engine: shells out to `git clone --progress`, parsing git's
//! side-band stderr output for percentage updates and pushing them into
//! the shared [`ProgressRegistry`], throttled to one update per 100ms.
//! Scratch directories are allocated with `tempfile` but promoted with
//! `into_path()` so they survive past the engine's own lifetime — cleanup
//! after a cancelled or abandoned clone is the caller's job, not this
//! struct's `Drop`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gradelib_core::{CloneState, Credentials, ProgressRegistry};
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::Semaphore;

use crate::credentials::{inject_credentials, redact};
use crate::error::GitError;

const PROGRESS_THROTTLE: Duration = Duration::from_millis(100);

/// Default clone concurrency: min(8, cpu count).
pub fn default_clone_concurrency() -> usize {
    std::cmp::min(8, num_cpus::get())
}

pub struct CloneEngine {
    semaphore: Arc<Semaphore>,
}

impl CloneEngine {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Clones `url` into a fresh scratch directory under `base_dir`,
    /// streaming progress into `registry`. Always leaves `registry` in a
    /// terminal state for `url` when it returns, whether or not the
    /// clone succeeded.
    pub async fn clone(
        &self,
        url: &str,
        creds: &Credentials,
        registry: &ProgressRegistry,
        base_dir: &Path,
    ) -> Result<PathBuf, GitError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| GitError::Spawn(e.to_string()))?;

        registry.set(url, CloneState::Cloning { progress: 0 });

        let scratch = match allocate_scratch_dir(base_dir, url) {
            Ok(p) => p,
            Err(e) => {
                registry.set(
                    url,
                    CloneState::Failed {
                        error_message: e.to_string(),
                    },
                );
                return Err(e);
            }
        };

        let rewritten = inject_credentials(url, creds);

        match run_clone(&rewritten, &scratch, registry, url).await {
            Ok(()) => {
                registry.set(
                    url,
                    CloneState::Completed {
                        scratch_path: scratch.clone(),
                    },
                );
                Ok(scratch)
            }
            Err(e) => {
                registry.set(
                    url,
                    CloneState::Failed {
                        error_message: redact(&e.to_string()),
                    },
                );
                Err(e)
            }
        }
    }
}

async fn run_clone(
    rewritten_url: &str,
    scratch: &Path,
    registry: &ProgressRegistry,
    url: &str,
) -> Result<(), GitError> {
    let mut child = Command::new("git")
        .args(["clone", "--progress", rewritten_url])
        .arg(scratch)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitError::ExecutableNotFound
            } else {
                GitError::Spawn(e.to_string())
            }
        })?;

    let stderr = child.stderr.take().expect("stderr was piped");
    let mut lines = BufReader::new(stderr).lines();
    let percent_re = Regex::new(r"(\d{1,3})%").expect("static regex");
    let mut last_update = Instant::now() - PROGRESS_THROTTLE;
    let mut last_line = String::new();

    while let Ok(Some(line)) = lines.next_line().await {
        last_line = line.clone();
        if let Some(caps) = percent_re.captures(&line) {
            if let Ok(pct) = caps[1].parse::<u8>() {
                let now = Instant::now();
                if now.duration_since(last_update) >= PROGRESS_THROTTLE {
                    registry.update_progress(url, pct.min(100));
                    last_update = now;
                }
            }
        }
    }

    let status = child
        .wait()
        .await
        .map_err(|e| GitError::Spawn(e.to_string()))?;

    if !status.success() {
        return Err(GitError::CommandFailed {
            subcommand: "clone".to_string(),
            status: status.code().unwrap_or(-1),
            stderr: redact(&last_line),
        });
    }

    Ok(())
}

fn allocate_scratch_dir(base_dir: &Path, url: &str) -> Result<PathBuf, GitError> {
    std::fs::create_dir_all(base_dir)?;
    let slug: String = url
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let prefix = format!("{slug}-");
    let dir = tempfile::Builder::new()
        .prefix(&prefix)
        .tempdir_in(base_dir)
        .map_err(GitError::Io)?;
    // Detach from RAII cleanup: the scratch directory's lifetime is the
    // manager's lifetime, not this allocation call's.
    Ok(dir.into_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_concurrency_is_bounded() {
        assert!(default_clone_concurrency() >= 1);
        assert!(default_clone_concurrency() <= 8);
    }

    #[tokio::test]
    async fn clone_of_local_repo_reaches_completed() {
        let src = tempfile::tempdir().unwrap();
        crate::process::run_git_blocking(src.path(), &["init", "-q"]).unwrap();
        crate::process::run_git_blocking(
            src.path(),
            &["config", "user.email", "t@example.test"],
        )
        .unwrap();
        crate::process::run_git_blocking(src.path(), &["config", "user.name", "T"]).unwrap();
        std::fs::write(src.path().join("a.txt"), "hello\n").unwrap();
        crate::process::run_git_blocking(src.path(), &["add", "."]).unwrap();
        crate::process::run_git_blocking(src.path(), &["commit", "-q", "-m", "init"]).unwrap();

        let engine = CloneEngine::new(2);
        let registry = ProgressRegistry::new();
        let dest_base = tempfile::tempdir().unwrap();
        let creds = Credentials::new("unused");
        let url = src.path().to_string_lossy().to_string();

        let result = engine
            .clone(&url, &creds, &registry, dest_base.path())
            .await;
        assert!(result.is_ok());
        assert!(matches!(
            registry.get(&url),
            Some(CloneState::Completed { .. })
        ));
    }

    #[tokio::test]
    async fn clone_of_missing_repo_reaches_failed() {
        let engine = CloneEngine::new(1);
        let registry = ProgressRegistry::new();
        let dest_base = tempfile::tempdir().unwrap();
        let creds = Credentials::new("unused");
        let url = "/nonexistent/path/to/repo".to_string();

        let result = engine
            .clone(&url, &creds, &registry, dest_base.path())
            .await;
        assert!(result.is_err());
        assert!(matches!(
            registry.get(&url),
            Some(CloneState::Failed { .. })
        ));
    }
}
