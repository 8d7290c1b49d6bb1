//! Errors raised while talking to the `git` executable.

use thiserror::Error;

/// Failures of version-control queries.
#[derive(Error, Debug)]
pub enum GitError {
    /// A git command exited with a status the caller does not accept.
    #[error("git {} failed: {stderr}", .args.join(" "))]
    CommandFailed {
        /// Arguments passed to git.
        args: Vec<String>,
        /// Exit status, if the process was not killed by a signal.
        status: Option<i32>,
        /// Captured error output (or the exit status when git printed nothing).
        stderr: String,
    },

    /// The git executable could not be started.
    #[error("failed to run git {}", .args.join(" "))]
    Spawn {
        /// Arguments passed to git.
        args: Vec<String>,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Repository root discovery failed.
    #[error("not a git repository: {0}")]
    RepositoryNotFound(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_names_the_command() {
        let err = GitError::CommandFailed {
            args: vec!["diff".to_string(), "--cached".to_string()],
            status: Some(128),
            stderr: "fatal: bad revision".to_string(),
        };
        assert_eq!(err.to_string(), "git diff --cached failed: fatal: bad revision");
    }

    #[test]
    fn spawn_keeps_io_source() {
        let err = GitError::Spawn {
            args: vec!["status".to_string()],
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.to_string(), "failed to run git status");
        assert!(std::error::Error::source(&err).is_some());
    }
}
