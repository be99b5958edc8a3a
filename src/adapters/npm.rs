//! npm registry queries

use super::{PackageRegistry, run_captured};
use crate::core::error::ReleaseResult;
use crate::core::vcs::Repo;
use crate::release::version::bare;

#[derive(Debug, Clone)]
pub struct Npm {
  program: String,
}

impl Npm {
  pub fn new(program: impl Into<String>) -> Self {
    Self { program: program.into() }
  }
}

impl Default for Npm {
  fn default() -> Self {
    Self::new("npm")
  }
}

impl PackageRegistry for Npm {
  fn published(&self, repo: &Repo, package: &str, version: &str) -> ReleaseResult<bool> {
    let version = bare(version);
    let args = vec![
      "view".to_string(),
      format!("{}@{}", package, version),
      "version".to_string(),
    ];
    let output = run_captured(&self.program, &args, repo)?;
    Ok(listed(&String::from_utf8_lossy(&output.stdout), version))
  }
}

/// `npm view` prints nothing for an unknown version of a known package
fn listed(stdout: &str, version: &str) -> bool {
  stdout.lines().any(|line| line.trim() == version)
}
