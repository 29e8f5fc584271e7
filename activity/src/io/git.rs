//! Git adapter for committing the updated README.
//!
//! A small, explicit wrapper around `git` subprocess calls. Every call runs in
//! the configured working directory with captured output and a timeout.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::io::process::{CommandOutput, run_command_with_timeout};

/// Result of `git commit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// Git reported "nothing to commit"; treated as success.
    NothingToCommit,
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    timeout: Duration,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            workdir: workdir.into(),
            timeout,
        }
    }

    /// Set the commit author for this repository.
    #[instrument(skip_all, fields(name = %name))]
    pub fn configure_identity(&self, name: &str, email: &str) -> Result<()> {
        self.run_checked(&["config", "user.email", email])?;
        self.run_checked(&["config", "user.name", name])?;
        debug!(name, "configured commit identity");
        Ok(())
    }

    /// Stage a single path.
    pub fn add(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run_checked(&["add", "--", &path])?;
        Ok(())
    }

    /// Commit staged changes with a message.
    ///
    /// A non-zero exit whose output says "nothing to commit" is not an error.
    #[instrument(skip_all)]
    pub fn commit(&self, message: &str) -> Result<CommitOutcome> {
        let args = ["commit", "-m", message];
        let output = self.run(&args)?;
        if output.success() {
            debug!("committed staged changes");
            return Ok(CommitOutcome::Committed);
        }
        if !output.timed_out && output.combined_text().contains("nothing to commit") {
            debug!("nothing to commit");
            return Ok(CommitOutcome::NothingToCommit);
        }
        Err(failure(&args, &output))
    }

    /// Push the current branch to its upstream.
    #[instrument(skip_all)]
    pub fn push(&self) -> Result<()> {
        self.run_checked(&["push"])?;
        Ok(())
    }

    fn run_checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run(args)?;
        if !output.success() {
            return Err(failure(args, &output));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.workdir);
        run_command_with_timeout(cmd, self.timeout)
            .map_err(|err| err.context(format!("spawn git {}", args.join(" "))))
    }
}

fn failure(args: &[&str], output: &CommandOutput) -> anyhow::Error {
    if output.timed_out {
        warn!(command = args.first().copied().unwrap_or_default(), "git timed out");
        return anyhow!("git {} timed out", args.join(" "));
    }
    warn!(exit_code = ?output.status.code(), "git command failed");
    anyhow!(
        "git {} failed with status {:?}: {}",
        args.join(" "),
        output.status.code(),
        output.combined_text().trim()
    )
}

/// Result of publishing the README.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOutcome {
    pub commit: CommitOutcome,
}

/// Abstraction over committing and pushing the updated document.
///
/// Tests use a recording publisher that never touches git.
pub trait Publisher {
    fn publish(&self, path: &Path, message: &str) -> Result<PublishOutcome>;
}

/// Publisher that commits with a fixed identity and pushes to the upstream.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    git: Git,
    name: String,
    email: String,
}

impl GitPublisher {
    pub fn new(git: Git, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            git,
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Publisher for GitPublisher {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn publish(&self, path: &Path, message: &str) -> Result<PublishOutcome> {
        self.git.configure_identity(&self.name, &self.email)?;
        self.git.add(path)?;
        let commit = self.git.commit(message)?;
        self.git.push()?;
        info!(?commit, "pushed to remote repository");
        Ok(PublishOutcome { commit })
    }
}
