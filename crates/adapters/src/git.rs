//! Version control adapter that shells out to the `git` binary

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use wechat_publisher_domain::{CommitOutcome, VcsError, VersionControl};

/// Detail reported when there was nothing to commit
pub const NOTHING_TO_COMMIT: &str = "nothing to commit";

/// Runs git commands inside one working tree
pub struct GitCli {
    repo_path: PathBuf,
}

/// One entry of `git status --porcelain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    /// Two-letter porcelain code, e.g. ` M` or `??`
    pub status: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingTreeStatus {
    pub branch: Option<String>,
    pub clean: bool,
    pub files: Vec<FileChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub hash: String,
    pub author: String,
    /// Author date, ISO-8601 as printed by git
    pub date: String,
    pub message: String,
}

// Subject last so a `|` inside it survives the split
const LOG_FORMAT: &str = "--pretty=format:%h|%an|%ai|%s";

struct GitOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl GitCli {
    pub fn new(repo_path: impl AsRef<Path>) -> Self {
        Self {
            repo_path: repo_path.as_ref().to_path_buf(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<GitOutput, VcsError> {
        tracing::debug!(repo = %self.repo_path.display(), ?args, "Running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .await
            .map_err(|e| VcsError::Spawn(e.to_string()))?;

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_checked(&self, args: &[&str]) -> Result<String, VcsError> {
        let output = self.run(args).await?;
        if !output.success {
            return Err(VcsError::Command {
                command: args.first().copied().unwrap_or_default().to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    async fn changed_files(&self) -> Result<Vec<FileChange>, VcsError> {
        let stdout = self.run_checked(&["status", "--porcelain"]).await?;
        Ok(stdout
            .lines()
            .filter(|line| line.len() >= 3)
            .map(|line| FileChange {
                status: line[..2].to_string(),
                path: line[3..].to_string(),
            })
            .collect())
    }

    /// Uncommitted changes plus the current branch
    pub async fn status(&self) -> Result<WorkingTreeStatus, VcsError> {
        let files = self.changed_files().await?;
        Ok(WorkingTreeStatus {
            branch: self.current_branch().await?,
            clean: files.is_empty(),
            files,
        })
    }

    /// Most recent commits, newest first. A repository without commits has none.
    pub async fn log(&self, limit: usize) -> Result<Vec<CommitSummary>, VcsError> {
        let count = format!("-{}", limit);
        let output = self.run(&["log", &count, LOG_FORMAT]).await?;

        if !output.success {
            if output.stderr.contains("does not have any commits") {
                return Ok(Vec::new());
            }
            return Err(VcsError::Command {
                command: "log".to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output
            .stdout
            .lines()
            .filter_map(|line| {
                let mut parts = line.splitn(4, '|');
                Some(CommitSummary {
                    hash: parts.next()?.to_string(),
                    author: parts.next()?.to_string(),
                    date: parts.next()?.to_string(),
                    message: parts.next()?.to_string(),
                })
            })
            .collect())
    }

    /// Name of the checked-out branch, `None` on a detached head
    pub async fn current_branch(&self) -> Result<Option<String>, VcsError> {
        let stdout = self.run_checked(&["branch", "--show-current"]).await?;
        let branch = stdout.trim();
        Ok((!branch.is_empty()).then(|| branch.to_string()))
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn stage_and_commit(&self, message: &str) -> Result<CommitOutcome, VcsError> {
        if self.changed_files().await?.is_empty() {
            tracing::debug!("Working tree clean, skipping commit");
            return Ok(CommitOutcome {
                committed: false,
                detail: NOTHING_TO_COMMIT.to_string(),
            });
        }

        self.run_checked(&["add", "."]).await?;
        let stdout = self.run_checked(&["commit", "-m", message]).await?;

        tracing::info!(message, "Committed changes");
        Ok(CommitOutcome {
            committed: true,
            detail: stdout.trim().to_string(),
        })
    }

    async fn push(&self, remote: &str, branch: Option<&str>) -> Result<String, VcsError> {
        let stdout = match branch {
            Some(branch) => self.run_checked(&["push", remote, branch]).await?,
            None => self.run_checked(&["push", remote]).await?,
        };

        tracing::info!(remote, branch, "Pushed changes");
        Ok(stdout)
    }
}
