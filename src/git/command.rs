//! Thin wrapper around the `git` executable.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use tracing::debug;

use crate::git::error::GitError;

/// Exit statuses accepted from diff queries; 1 means "differences present".
pub const DIFF_EXIT_CODES: &[i32] = &[0, 1];

/// Leading options that stop git from C-quoting non-ASCII path names.
/// They must precede the subcommand.
pub const VERBATIM_PATHS: [&str; 2] = ["-c", "core.quotePath=false"];

/// Runs git in `dir`, accepting only a zero exit status.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    run_git_allowing(dir, &[0], args)
}

/// Runs git in `dir` and returns its stdout when the exit status is one of
/// `allowed`.
///
/// Any other status becomes [`GitError::CommandFailed`] carrying the trimmed
/// stderr of the command.
pub fn run_git_allowing(dir: &Path, allowed: &[i32], args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|source| GitError::Spawn {
            args: owned(args),
            source,
        })?;

    let status = output.status.code();
    debug!(
        args = ?args,
        status = ?status,
        stdout_len = output.stdout.len(),
        "git command finished"
    );

    if status.is_some_and(|code| allowed.contains(&code)) {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        stderr = output.status.to_string();
    }
    Err(GitError::CommandFailed {
        args: owned(args),
        status,
        stderr,
    }
    .into())
}

/// Returns the top-level directory of the repository containing `start`.
pub fn repo_root(start: &Path) -> Result<PathBuf> {
    match run_git(start, &["rev-parse", "--show-toplevel"]) {
        Ok(out) => Ok(PathBuf::from(out.trim())),
        Err(err) => Err(GitError::RepositoryNotFound(err.to_string()).into()),
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| (*arg).to_string()).collect()
}
