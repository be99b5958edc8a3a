//! System git backend
//!
//! Every operation is one `git` subprocess run against the project's working tree
//! with an isolated environment. Credentials for `remote update` and
//! `fetch --tags` come from the SSH agent, so `SSH_AUTH_SOCK` is passed through
//! alongside PATH and HOME.

use super::{Repo, TreeStatus, Vcs};
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use std::process::{Command, Output};

/// Git backend using the system `git` executable
#[derive(Debug, Clone, Default)]
pub struct SystemGit;

impl SystemGit {
  pub fn new() -> Self {
    Self
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the repo path
  /// - Clears environment variables
  /// - Whitelists only PATH, HOME and SSH_AUTH_SOCK
  /// - Adds safe configuration overrides
  fn git_cmd(&self, repo: &Repo) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&repo.path);

    cmd.env_clear();
    for var in ["PATH", "HOME", "SSH_AUTH_SOCK"] {
      if let Ok(value) = std::env::var(var) {
        cmd.env(var, value);
      }
    }
    // Status text is parsed, so pin the language
    cmd.env("LC_ALL", "C");

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }

  /// Run `git <args>` and return its output, failing on non-zero exit
  fn run(&self, repo: &Repo, args: &[&str]) -> ReleaseResult<Output> {
    let command = format!("git {}", args.join(" "));
    tracing::debug!(project = %repo.name, "{}", command);

    let output = self
      .git_cmd(repo)
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute '{}' in {}", command, repo.path.display()))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ReleaseError::command(command, &repo.name, stderr.trim()));
    }

    Ok(output)
  }

  fn stdout(&self, repo: &Repo, args: &[&str]) -> ReleaseResult<String> {
    let output = self.run(repo, args)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }
}

impl Vcs for SystemGit {
  fn checkout(&self, repo: &Repo, branch: &str) -> ReleaseResult<()> {
    self.run(repo, &["checkout", branch]).map(|_| ())
  }

  fn remote_update(&self, repo: &Repo) -> ReleaseResult<()> {
    self.run(repo, &["remote", "update"]).map(|_| ())
  }

  fn status(&self, repo: &Repo) -> ReleaseResult<TreeStatus> {
    let output = self.stdout(repo, &["status", "-uno"])?;
    Ok(TreeStatus::parse(&output))
  }

  fn fetch_tags(&self, repo: &Repo) -> ReleaseResult<()> {
    self.run(repo, &["fetch", "--tags"]).map(|_| ())
  }

  fn has_tag(&self, repo: &Repo, tag: &str) -> ReleaseResult<bool> {
    let output = self.stdout(repo, &["tag", "--list", tag])?;
    Ok(output.lines().any(|line| line.trim() == tag))
  }

  fn last_commit(&self, repo: &Repo) -> ReleaseResult<String> {
    let output = self.stdout(repo, &["show", "-s", "--format=%ci"])?;
    Ok(output.trim().to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  fn run_git(dir: &std::path::Path, args: &[&str]) {
    let status = Command::new("git").arg("-C").arg(dir).args(args).status().unwrap();
    assert!(status.success(), "git {:?} failed", args);
  }

  fn init_repo() -> (TempDir, Repo) {
    let dir = TempDir::new().unwrap();
    run_git(dir.path(), &["init", "-q", "-b", "main"]);
    run_git(dir.path(), &["config", "user.name", "Test User"]);
    run_git(dir.path(), &["config", "user.email", "test@example.com"]);
    run_git(dir.path(), &["config", "commit.gpgsign", "false"]);
    fs::write(dir.path().join("CHANGELOG.md"), "# CHANGELOG\n").unwrap();
    run_git(dir.path(), &["add", "."]);
    run_git(dir.path(), &["commit", "-q", "-m", "initial"]);

    let repo = Repo {
      name: "test-project".to_string(),
      path: dir.path().to_path_buf(),
    };
    (dir, repo)
  }

  #[test]
  fn test_status_detects_unstaged_changes() {
    let (dir, repo) = init_repo();
    let git = SystemGit::new();

    assert!(!git.status(&repo).unwrap().unstaged);
    fs::write(dir.path().join("CHANGELOG.md"), "# CHANGELOG\n\n## Unreleased\n").unwrap();
    assert!(git.status(&repo).unwrap().unstaged);
  }

  #[test]
  fn test_has_tag_exact_match() {
    let (dir, repo) = init_repo();
    let git = SystemGit::new();

    assert!(!git.has_tag(&repo, "v0.8.9").unwrap());
    run_git(dir.path(), &["tag", "v0.8.9"]);
    assert!(git.has_tag(&repo, "v0.8.9").unwrap());
    assert!(!git.has_tag(&repo, "v0.8").unwrap());
  }

  #[test]
  fn test_last_commit_and_checkout() {
    let (dir, repo) = init_repo();
    let git = SystemGit::new();

    assert!(!git.last_commit(&repo).unwrap().is_empty());
    run_git(dir.path(), &["branch", "release"]);
    git.checkout(&repo, "release").unwrap();
    assert!(git.checkout(&repo, "no-such-branch").is_err());
  }

  #[test]
  fn test_failure_is_tagged_with_project() {
    let (_dir, repo) = init_repo();
    let err = SystemGit::new().checkout(&repo, "no-such-branch").unwrap_err();
    match err {
      ReleaseError::Command { command, project, .. } => {
        assert_eq!(command, "git checkout no-such-branch");
        assert_eq!(project, "test-project");
      }
      other => panic!("unexpected error: {:?}", other),
    }
  }
}
