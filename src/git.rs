//! Git operations.
//!
//! Shells out to the system `git` binary so the user's config, hooks and
//! signing setup apply exactly as they would for a manual commit.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::GitError;

/// The two repository operations the commit flow needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Repository {
    /// Diff of the index against HEAD, or `None` when nothing is staged.
    async fn staged_diff(&self) -> Result<Option<String>, GitError>;

    /// Commits the staged changes with `message`, verbatim.
    async fn commit(&self, message: &str) -> Result<(), GitError>;
}

/// [`Repository`] backed by the `git` CLI.
#[derive(Debug, Default)]
pub struct GitCli {
    /// Working directory for git; `None` means the process's cwd.
    workdir: Option<PathBuf>,
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn in_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            workdir: Some(path.into()),
        }
    }

    async fn run(&self, args: &[&str], operation: &'static str) -> Result<String, GitError> {
        debug!(?args, "running git");

        let mut command = Command::new("git");
        command.args(args);
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .map_err(|source| GitError::Spawn { operation, source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            // `git commit` reports "nothing to commit" on stdout.
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(GitError::Failed {
                operation,
                stderr: detail,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Repository for GitCli {
    async fn staged_diff(&self) -> Result<Option<String>, GitError> {
        let staged = self
            .run(&["diff", "--cached", "--name-only"], "status")
            .await?;

        let staged_count = staged.lines().filter(|l| !l.trim().is_empty()).count();
        debug!(staged_count, "staged paths");
        if staged_count == 0 {
            return Ok(None);
        }

        let diff = self.run(&["diff", "--cached"], "diff").await?;
        Ok(Some(diff))
    }

    async fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run(&["commit", "-m", message], "commit").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("git should run");
        assert!(status.status.success(), "git {:?} failed", args);
    }

    fn init_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["config", "user.name", "Test User"]);
        git(dir.path(), &["config", "user.email", "test@example.com"]);
        git(dir.path(), &["config", "commit.gpgsign", "false"]);
        dir
    }

    #[tokio::test]
    async fn no_staged_paths_yields_none() {
        let dir = init_repo();
        std::fs::write(dir.path().join("untracked.txt"), "hello\n").unwrap();

        let repo = GitCli::in_dir(dir.path());
        assert!(repo.staged_diff().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn staged_file_appears_in_diff() {
        let dir = init_repo();
        std::fs::write(dir.path().join("widget.rs"), "fn widget() {}\n").unwrap();
        git(dir.path(), &["add", "widget.rs"]);

        let repo = GitCli::in_dir(dir.path());
        let diff = repo.staged_diff().await.unwrap().expect("diff expected");
        assert!(diff.contains("widget.rs"));
        assert!(diff.contains("+fn widget() {}"));
    }

    #[tokio::test]
    async fn unstaged_edits_are_excluded() {
        let dir = init_repo();
        std::fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        git(dir.path(), &["add", "a.txt"]);
        std::fs::write(dir.path().join("a.txt"), "one\ntwo\n").unwrap();

        let repo = GitCli::in_dir(dir.path());
        let diff = repo.staged_diff().await.unwrap().unwrap();
        assert!(diff.contains("+one"));
        assert!(!diff.contains("+two"));
    }

    #[tokio::test]
    async fn commit_uses_message_verbatim() {
        let dir = init_repo();
        std::fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        git(dir.path(), &["add", "a.txt"]);

        let repo = GitCli::in_dir(dir.path());
        repo.commit("feat: add widget").await.unwrap();

        let log = std::process::Command::new("git")
            .args(["log", "-1", "--format=%s"])
            .current_dir(dir.path())
            .output()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&log.stdout).trim(), "feat: add widget");
        assert!(repo.staged_diff().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn commit_with_nothing_staged_fails() {
        let dir = init_repo();
        let repo = GitCli::in_dir(dir.path());

        let err = repo.commit("chore: nothing").await.unwrap_err();
        assert!(matches!(err, GitError::Failed { operation: "commit", .. }));
    }
}
