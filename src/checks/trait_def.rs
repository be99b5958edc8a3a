//! Gate trait abstraction for release preconditions
//!
//! A gate is a per-project precondition that a human fixes by hand: a changelog
//! entry, a README release row, a manifest version, a commit. Every gate knows
//! how to check itself, which file to open for the fix, and what to watch to
//! notice that the fix has been made.

use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::projects::Project;
use std::fs;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

/// Result of checking one project against one gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateResult {
  pub passed: bool,
  /// Human-readable message
  pub message: String,
  /// Optional remediation hint (e.g. suggested release notes)
  pub hint: Option<String>,
}

impl GateResult {
  pub fn pass() -> Self {
    Self {
      passed: true,
      message: String::new(),
      hint: None,
    }
  }

  pub fn fail(message: impl Into<String>) -> Self {
    Self {
      passed: false,
      message: message.into(),
      hint: None,
    }
  }

  pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
    self.hint = Some(hint.into());
    self
  }
}

/// What changes when a failed gate has been remediated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchTarget {
  /// Modification time of a file
  File(PathBuf),
  /// Timestamp of the most recent commit
  LastCommit,
}

pub trait Gate {
  /// State key for this gate (kebab-case)
  fn name(&self) -> &'static str;

  /// Human-readable description of what this gate validates
  fn description(&self) -> &'static str;

  /// Whether the gate checks this project at all
  fn applies_to(&self, _ctx: &ReleaseContext, _project: &Project) -> bool {
    true
  }

  fn check(&self, ctx: &ReleaseContext, project: &Project) -> ReleaseResult<GateResult>;

  fn watch_target(&self, ctx: &ReleaseContext, project: &Project) -> WatchTarget;

  /// File opened in the editor when the gate fails
  fn remedy_file(&self, ctx: &ReleaseContext, project: &Project) -> Option<PathBuf> {
    match self.watch_target(ctx, project) {
      WatchTarget::File(path) => Some(path),
      WatchTarget::LastCommit => None,
    }
  }

  /// Opaque value that changes when the watch target changes
  fn fingerprint(&self, ctx: &ReleaseContext, project: &Project) -> ReleaseResult<String> {
    match self.watch_target(ctx, project) {
      WatchTarget::File(path) => Ok(modified(&path)),
      WatchTarget::LastCommit => ctx.tools.vcs.last_commit(&ctx.repo(project)),
    }
  }
}

/// File mtime in nanoseconds, `missing` when the file does not exist
pub(crate) fn modified(path: &std::path::Path) -> String {
  fs::metadata(path)
    .and_then(|m| m.modified())
    .ok()
    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
    .map(|d| d.as_nanos().to_string())
    .unwrap_or_else(|| "missing".to_string())
}
