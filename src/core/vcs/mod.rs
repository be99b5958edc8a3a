//! Version control operations used by the release pipeline
//!
//! The pipeline only ever asks a handful of questions of a repository: is the
//! tree clean, is the branch pushed, does the release tag exist. [`Vcs`] is that
//! surface; [`SystemGit`] answers it with `git` subprocesses and tests answer it
//! with fakes.

pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::ReleaseResult;
use crate::projects::Project;
use std::path::{Path, PathBuf};

/// A project's working tree, tagged with the project name for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
  pub name: String,
  pub path: PathBuf,
}

impl Repo {
  pub fn of(project: &Project, workspace: &Path) -> Self {
    Self {
      name: project.name.clone(),
      path: project.root(workspace),
    }
  }
}

/// Working tree state as reported by `git status -uno`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStatus {
  /// Tracked files modified but not staged
  pub unstaged: bool,
  /// Branch matches its origin counterpart
  pub up_to_date: bool,
}

impl TreeStatus {
  pub fn parse(output: &str) -> Self {
    Self {
      unstaged: output.contains("Changes not staged for commit"),
      up_to_date: output.contains("Your branch is up to date with 'origin/"),
    }
  }
}

pub trait Vcs {
  /// Switch the working tree to `branch`
  fn checkout(&self, repo: &Repo, branch: &str) -> ReleaseResult<()>;

  /// Refresh remote-tracking refs
  fn remote_update(&self, repo: &Repo) -> ReleaseResult<()>;

  fn status(&self, repo: &Repo) -> ReleaseResult<TreeStatus>;

  fn fetch_tags(&self, repo: &Repo) -> ReleaseResult<()>;

  /// Whether `tag` exists locally (call [`Vcs::fetch_tags`] first for remote tags)
  fn has_tag(&self, repo: &Repo, tag: &str) -> ReleaseResult<bool>;

  /// Committer timestamp of HEAD, as an opaque string
  fn last_commit(&self, repo: &Repo) -> ReleaseResult<String>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_clean_tree() {
    let output = "On branch main\nYour branch is up to date with 'origin/main'.\n\nnothing to commit (use -u to show untracked files)\n";
    let status = TreeStatus::parse(output);
    assert!(status.up_to_date);
    assert!(!status.unstaged);
  }

  #[test]
  fn test_parse_unstaged_not_up_to_date() {
    let output = "On branch master\nYour branch is ahead of 'origin/master' by 2 commits.\n  (use \"git push\" to publish your local commits)\n\nChanges not staged for commit:\n  modified:   CHANGELOG.md\n";
    let status = TreeStatus::parse(output);
    assert!(status.unstaged);
    assert!(!status.up_to_date);
  }

  #[test]
  fn test_parse_no_upstream() {
    let status = TreeStatus::parse("On branch main\nnothing to commit\n");
    assert_eq!(status, TreeStatus::default());
  }
}
