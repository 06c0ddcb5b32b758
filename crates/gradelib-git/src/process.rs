//! Thin wrappers around shelling out to the `git` executable on `PATH`.
//!
//! The engines never use libgit2 bindings — per the external-interfaces
//! contract this crate implements, every git operation is a subprocess
//! invocation, the same approach GitPilot's `models::Commit::from_show_format`
//! and `client_manager::TokenResolver::get_token` (which shells out to the
//! `gh` CLI) both take for external-tool integration.

use std::path::Path;
use std::process::Output;

use crate::error::GitError;

/// Field separator used in custom `git show`/`git for-each-ref` format
/// strings. `\x1f` (unit separator) never appears in ordinary commit
/// metadata, so splitting on it is safe even when messages contain
/// arbitrary text.
pub const FIELD_SEP: &str = "\x1f";

/// Runs a git subcommand to completion off the async event loop via
/// `spawn_blocking`, returning stdout decoded lossily as UTF-8. Used by
/// every CPU-bound analysis command (rev-list, show, blame, for-each-ref,
/// symbolic-ref) — none of these need streaming progress, unlike clone.
pub async fn run_git(cwd: &Path, args: &[&str]) -> Result<String, GitError> {
    let cwd = cwd.to_path_buf();
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let subcommand = args.first().cloned().unwrap_or_default();
    tokio::task::spawn_blocking(move || {
        let args_ref: Vec<&str> = args.iter().map(String::as_str).collect();
        run_git_blocking(&cwd, &args_ref)
    })
    .await
    .map_err(|e| GitError::Spawn(e.to_string()))?
    .map_err(|e| annotate(e, &subcommand))
}

/// Synchronous variant, meant to be called from inside a `spawn_blocking`
/// closure (or, in tests, directly from a non-async context).
pub fn run_git_blocking(cwd: &Path, args: &[&str]) -> Result<String, GitError> {
    let output: Output = std::process::Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitError::ExecutableNotFound
            } else {
                GitError::Spawn(e.to_string())
            }
        })?;

    if !output.status.success() {
        return Err(GitError::CommandFailed {
            subcommand: args.first().map(|s| s.to_string()).unwrap_or_default(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn annotate(err: GitError, subcommand: &str) -> GitError {
    match err {
        GitError::CommandFailed {
            subcommand: _,
            status,
            stderr,
        } => GitError::CommandFailed {
            subcommand: subcommand.to_string(),
            status,
            stderr,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn init_repo(dir: &Path) {
        let status = Command::new("git")
            .args(["init", "-q"])
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success());
        Command::new("git")
            .args(["config", "user.email", "test@example.test"])
            .current_dir(dir)
            .status()
            .unwrap();
        Command::new("git")
            .args(["config", "user.name", "Test"])
            .current_dir(dir)
            .status()
            .unwrap();
    }

    #[test]
    fn runs_a_simple_command() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let out = run_git_blocking(dir.path(), &["status", "--short"]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn surfaces_command_failure() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let err = run_git_blocking(dir.path(), &["show", "deadbeef"]).unwrap_err();
        matches!(err, GitError::CommandFailed { .. });
    }
}
