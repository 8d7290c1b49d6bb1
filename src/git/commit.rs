//! Commit creation from an accepted message.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::git::collect::Scope;
use crate::git::error::GitError;

/// Creates a commit with `message` for the changes covered by `scope`.
///
/// The message is trimmed and passed through a temporary file with
/// `git commit -F`. Tracked modifications are included with `-a` for the
/// wider scopes, and the widest scope stages untracked files with
/// `git add .` first. Git's own output goes straight to the terminal.
pub fn commit_with_message(root: &Path, message: &str, scope: Scope) -> Result<()> {
    let message = message.trim();
    if message.is_empty() {
        bail!("Refusing to commit with an empty message");
    }

    let mut file = tempfile::Builder::new()
        .prefix("commitsmith-message-")
        .suffix(".txt")
        .tempfile()
        .context("Failed to create temporary commit message file")?;
    writeln!(file, "{message}").context("Failed to write commit message file")?;
    file.flush()?;

    if scope == Scope::All {
        run_inherited(root, &["add", "."])?;
    }

    let message_path = file.path().to_string_lossy().into_owned();
    let mut args = vec!["commit"];
    if scope >= Scope::StagedUnstaged {
        args.push("-a");
    }
    args.extend(["-F", message_path.as_str()]);

    info!(scope = %scope, "creating commit");
    run_inherited(root, &args)
}

fn run_inherited(root: &Path, args: &[&str]) -> Result<()> {
    let owned = || -> Vec<String> { args.iter().map(|arg| (*arg).to_string()).collect() };
    let status = Command::new("git")
        .args(args)
        .current_dir(root)
        .status()
        .map_err(|source| GitError::Spawn {
            args: owned(),
            source,
        })?;

    if !status.success() {
        return Err(GitError::CommandFailed {
            args: owned(),
            status: status.code(),
            stderr: format!("{status}, see git output above"),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::git::command::run_git;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        run_git(root, &["init", "--quiet"]).unwrap();
        run_git(root, &["config", "user.name", "Test User"]).unwrap();
        run_git(root, &["config", "user.email", "test@example.com"]).unwrap();
        run_git(root, &["config", "commit.gpgsign", "false"]).unwrap();
        dir
    }

    fn last_message(root: &Path) -> String {
        run_git(root, &["log", "-1", "--format=%B"])
            .unwrap()
            .trim()
            .to_string()
    }

    #[test]
    fn commits_staged_changes_with_trimmed_message() {
        let dir = init_repo();
        fs::write(dir.path().join("a.txt"), "a\n").unwrap();
        run_git(dir.path(), &["add", "a.txt"]).unwrap();

        commit_with_message(dir.path(), "\n  feat: add a\n\nBody text.  \n", Scope::Staged).unwrap();

        assert_eq!(last_message(dir.path()), "feat: add a\n\nBody text.");
    }

    #[test]
    fn widest_scope_adds_untracked_files() {
        let dir = init_repo();
        fs::write(dir.path().join("new.txt"), "new\n").unwrap();

        commit_with_message(dir.path(), "chore: add new file", Scope::All).unwrap();

        let files = run_git(dir.path(), &["show", "--name-only", "--format=", "HEAD"]).unwrap();
        assert_eq!(files.trim(), "new.txt");
    }

    #[test]
    fn empty_message_is_rejected() {
        let dir = init_repo();
        let err = commit_with_message(dir.path(), "  \n ", Scope::Staged).unwrap_err();
        assert!(err.to_string().contains("empty message"));
    }

    #[test]
    fn nothing_to_commit_is_command_failed() {
        let dir = init_repo();
        let err = commit_with_message(dir.path(), "fix: nothing", Scope::Staged).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GitError>(),
            Some(GitError::CommandFailed { .. })
        ));
    }
}
