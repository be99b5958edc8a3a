//! CHANGELOG.md precondition

use super::trait_def::{Gate, GateResult, WatchTarget};
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::projects::{ChangelogStyle, Project};
use crate::release::version::bare;
use std::fs;

pub struct ChangelogGate;

impl Gate for ChangelogGate {
  fn name(&self) -> &'static str {
    "changelogs"
  }

  fn description(&self) -> &'static str {
    "CHANGELOG.md updated for release"
  }

  fn check(&self, ctx: &ReleaseContext, project: &Project) -> ReleaseResult<GateResult> {
    let path = project.changelog_path(&ctx.root);
    if !path.exists() {
      return Ok(GateResult::fail(format!("{} not found", path.display())));
    }

    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let version = ctx.version.for_project(&project.name);
    let versioned = project.changelog == ChangelogStyle::Versioned && !ctx.version.is_development();

    Ok(evaluate(&content, version, versioned))
  }

  fn watch_target(&self, ctx: &ReleaseContext, project: &Project) -> WatchTarget {
    WatchTarget::File(project.changelog_path(&ctx.root))
  }
}

/// Changelog rule, separated from I/O
///
/// The release heading may name the version with or without its `v` prefix.
pub fn evaluate(content: &str, version: &str, versioned: bool) -> GateResult {
  if content.contains("Unreleased") {
    return GateResult::fail("CHANGELOG has an 'Unreleased' section").with_hint(head(content));
  }

  if versioned {
    let prefixed = format!("# CHANGELOG\n\n## [{}]", version);
    let unprefixed = format!("# CHANGELOG\n\n## [{}]", bare(version));
    if !content.starts_with(&prefixed) && !content.starts_with(&unprefixed) {
      return GateResult::fail(format!("CHANGELOG has not been updated for {}", version)).with_hint(head(content));
    }
  }

  GateResult::pass()
}

/// First three lines, quoted
fn head(content: &str) -> String {
  content
    .lines()
    .take(3)
    .map(|line| format!(">> {}", line))
    .collect::<Vec<_>>()
    .join("\n")
}
