//! README.md precondition
//!
//! Project READMEs carry a release table. The default rule requires the version to
//! appear as a table cell, so a passing mention in prose (an upgrade note, say) does
//! not count as the release row.

use super::trait_def::{Gate, GateResult, WatchTarget};
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::projects::Project;
use crate::release::notes;
use regex::Regex;
use serde::Deserialize;
use std::fs;

/// How a README must mention the release version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadmeRule {
  /// `| <version> |`, whitespace optional
  #[default]
  TableCell,
  /// A markdown heading or bold line naming the version
  Heading,
  /// Anywhere in the text
  Substring,
}

impl ReadmeRule {
  pub fn matches(&self, content: &str, version: &str) -> ReleaseResult<bool> {
    let escaped = regex::escape(version);
    let matched = match self {
      ReadmeRule::TableCell => Regex::new(&format!(r"\|\s*{}\s*\|", escaped))?.is_match(content),
      ReadmeRule::Heading => {
        Regex::new(&format!(r"(?m)^(?:#{{1,6}}\s|\*\*).*{}(?:[^.0-9]|$)", escaped))?.is_match(content)
      }
      ReadmeRule::Substring => content.contains(version),
    };
    Ok(matched)
  }
}

pub struct ReadmeGate;

impl Gate for ReadmeGate {
  fn name(&self) -> &'static str {
    "readmes"
  }

  fn description(&self) -> &'static str {
    "README.md release table updated"
  }

  fn applies_to(&self, ctx: &ReleaseContext, project: &Project) -> bool {
    project.readme && !ctx.version.is_development()
  }

  fn check(&self, ctx: &ReleaseContext, project: &Project) -> ReleaseResult<GateResult> {
    let path = project.readme_path(&ctx.root);
    if !path.exists() {
      return Ok(GateResult::fail(format!("{} not found", path.display())));
    }

    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let version = ctx.version.for_project(&project.name);

    if ctx.settings.readme_rule.matches(&content, version)? {
      return Ok(GateResult::pass());
    }

    let result = GateResult::fail("README has not been updated for release");
    let changelog = fs::read_to_string(project.changelog_path(&ctx.root)).unwrap_or_default();
    let today = chrono::Local::now().date_naive();

    Ok(match notes::readme_entry(&project.name, version, &changelog, today) {
      Some(entry) => result.with_hint(entry),
      None => result,
    })
  }

  fn watch_target(&self, ctx: &ReleaseContext, project: &Project) -> WatchTarget {
    WatchTarget::File(project.readme_path(&ctx.root))
  }
}
