//! Uncommitted changes precondition

use super::trait_def::{Gate, GateResult, WatchTarget};
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::projects::Project;

pub struct UncommittedGate;

impl Gate for UncommittedGate {
  fn name(&self) -> &'static str {
    "uncommitted-changes"
  }

  fn description(&self) -> &'static str {
    "no uncommitted changes"
  }

  fn applies_to(&self, ctx: &ReleaseContext, project: &Project) -> bool {
    !ctx.exempt_uncommitted(project)
  }

  fn check(&self, ctx: &ReleaseContext, project: &Project) -> ReleaseResult<GateResult> {
    let repo = ctx.repo(project);
    ctx.tools.vcs.remote_update(&repo)?;
    let status = ctx.tools.vcs.status(&repo)?;

    if status.unstaged {
      Ok(GateResult::fail(format!("{} has uncommitted changes", project.name)))
    } else {
      Ok(GateResult::pass())
    }
  }

  /// Fixed by committing, so wait for a new commit
  fn watch_target(&self, _ctx: &ReleaseContext, _project: &Project) -> WatchTarget {
    WatchTarget::LastCommit
  }
}
