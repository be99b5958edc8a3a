//! Makefile-driven builds

use super::{BuildTarget, BuildTool, run_streamed};
use crate::core::error::ReleaseResult;
use crate::core::vcs::Repo;

/// Runs build targets with `make` (or a configured replacement)
#[derive(Debug, Clone)]
pub struct Make {
  program: String,
}

impl Make {
  pub fn new(program: impl Into<String>) -> Self {
    Self { program: program.into() }
  }
}

impl Default for Make {
  fn default() -> Self {
    Self::new("make")
  }
}

impl BuildTool for Make {
  fn run(&self, repo: &Repo, target: &BuildTarget) -> ReleaseResult<()> {
    run_streamed(&self.program, &target.args(), repo)
  }
}
