//! External command adapters
//!
//! The release pipeline drives tools it does not understand: each project's
//! Makefile, the npm CLI. The traits here are the seams; the implementations run
//! subprocesses in the project's working tree and turn a non-zero exit into a
//! [`ReleaseError::Command`] tagged with the command and the project.

pub mod checksum;
pub mod gomod;
pub mod make;
pub mod npm;

pub use make::Make;
pub use npm::Npm;

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::core::vcs::Repo;
use std::process::{Command, Output, Stdio};

/// Build tool targets used during a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildTarget {
  /// Refresh dependencies to their development heads
  Update,
  Build,
  /// Cross-compile for every platform
  BuildAll,
  /// Pin dependencies to their release versions
  UpdateRelease,
  Release { version: String, dist: String },
  Publish { version: String, dist: String },
  PublishNpm,
}

impl BuildTarget {
  /// `release` target for a project at a version
  pub fn release(project: &str, version: &str) -> Self {
    BuildTarget::Release {
      version: version.to_string(),
      dist: dist_name(project, version),
    }
  }

  pub fn publish(project: &str, version: &str) -> Self {
    BuildTarget::Publish {
      version: version.to_string(),
      dist: dist_name(project, version),
    }
  }

  /// Build tool arguments for this target
  pub fn args(&self) -> Vec<String> {
    let mut args = vec![self.name().to_string()];
    if let BuildTarget::Release { version, dist } | BuildTarget::Publish { version, dist } = self {
      args.push(format!("VERSION={}", version));
      args.push(format!("DIST={}", dist));
    }
    args
  }

  /// Makefile target name
  pub fn name(&self) -> &'static str {
    match self {
      BuildTarget::Update => "update",
      BuildTarget::Build => "build",
      BuildTarget::BuildAll => "build-all",
      BuildTarget::UpdateRelease => "update-release",
      BuildTarget::Release { .. } => "release",
      BuildTarget::Publish { .. } => "publish",
      BuildTarget::PublishNpm => "publish-npm",
    }
  }
}

/// Distribution directory name for a project release (`<project>_<version>`)
pub fn dist_name(project: &str, version: &str) -> String {
  format!("{}_{}", project, version)
}

pub trait BuildTool {
  fn run(&self, repo: &Repo, target: &BuildTarget) -> ReleaseResult<()>;
}

pub trait PackageRegistry {
  /// Whether `package` at `version` is visible on the registry
  fn published(&self, repo: &Repo, package: &str, version: &str) -> ReleaseResult<bool>;
}

/// Run a command in the repo with its output streamed to the terminal
pub(crate) fn run_streamed(program: &str, args: &[String], repo: &Repo) -> ReleaseResult<()> {
  let command = render(program, args);
  tracing::debug!(project = %repo.name, "{}", command);

  let status = Command::new(program)
    .args(args)
    .current_dir(&repo.path)
    .stdin(Stdio::inherit())
    .status()
    .with_context(|| format!("Failed to execute '{}' in {}", command, repo.path.display()))?;

  if !status.success() {
    return Err(ReleaseError::command(command, &repo.name, format!("exited with {}", status)));
  }

  Ok(())
}

/// Run a command in the repo and capture its output
pub(crate) fn run_captured(program: &str, args: &[String], repo: &Repo) -> ReleaseResult<Output> {
  let command = render(program, args);
  tracing::debug!(project = %repo.name, "{}", command);

  let output = Command::new(program)
    .args(args)
    .current_dir(&repo.path)
    .stdin(Stdio::null())
    .output()
    .with_context(|| format!("Failed to execute '{}' in {}", command, repo.path.display()))?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    return Err(ReleaseError::command(command, &repo.name, stderr.trim()));
  }

  Ok(output)
}

fn render(program: &str, args: &[String]) -> String {
  std::iter::once(program.to_string())
    .chain(args.iter().cloned())
    .collect::<Vec<_>>()
    .join(" ")
}
