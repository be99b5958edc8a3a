//! Persisted release state
//!
//! One JSON record per target version, rewritten in full after every change so an
//! interrupted run resumes where it stopped. The field names are the on-disk
//! format and are shared with earlier tooling; do not rename them.

use crate::core::error::{ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Completion marker of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
  #[default]
  NotStarted,
  Ok,
  /// Previously verified but invalidated by a later stage
  Unknown,
}

/// Persisted stages, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Changelogs,
  Readmes,
  PackageVersions,
  UncommittedChanges,
  Prepared,
  ReleaseNotes,
  Published,
}

impl Stage {
  pub const ALL: [Stage; 7] = [
    Stage::Changelogs,
    Stage::Readmes,
    Stage::PackageVersions,
    Stage::UncommittedChanges,
    Stage::Prepared,
    Stage::ReleaseNotes,
    Stage::Published,
  ];

  /// Field name in the state file
  pub fn key(&self) -> &'static str {
    match self {
      Stage::Changelogs => "changelogs",
      Stage::Readmes => "readmes",
      Stage::PackageVersions => "package-versions",
      Stage::UncommittedChanges => "uncommitted-changes",
      Stage::Prepared => "prepared",
      Stage::ReleaseNotes => "release-notes",
      Stage::Published => "published",
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseState {
  /// Projects without a release tag, absent until computed
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub unreleased: Option<Vec<String>>,
  #[serde(default)]
  pub changelogs: StageStatus,
  #[serde(default)]
  pub readmes: StageStatus,
  #[serde(default)]
  pub package_versions: StageStatus,
  #[serde(default)]
  pub uncommitted_changes: StageStatus,
  #[serde(default, alias = "prepare")]
  pub prepared: StageStatus,
  #[serde(default)]
  pub release_notes: StageStatus,
  #[serde(default)]
  pub published: StageStatus,
}

impl ReleaseState {
  pub fn status(&self, stage: Stage) -> StageStatus {
    match stage {
      Stage::Changelogs => self.changelogs,
      Stage::Readmes => self.readmes,
      Stage::PackageVersions => self.package_versions,
      Stage::UncommittedChanges => self.uncommitted_changes,
      Stage::Prepared => self.prepared,
      Stage::ReleaseNotes => self.release_notes,
      Stage::Published => self.published,
    }
  }

  pub fn set(&mut self, stage: Stage, status: StageStatus) {
    let field = match stage {
      Stage::Changelogs => &mut self.changelogs,
      Stage::Readmes => &mut self.readmes,
      Stage::PackageVersions => &mut self.package_versions,
      Stage::UncommittedChanges => &mut self.uncommitted_changes,
      Stage::Prepared => &mut self.prepared,
      Stage::ReleaseNotes => &mut self.release_notes,
      Stage::Published => &mut self.published,
    };
    *field = status;
  }

  pub fn is_done(&self, stage: Stage) -> bool {
    self.status(stage) == StageStatus::Ok
  }

  /// Drop a project from the unreleased set once it has been published
  pub fn mark_released(&mut self, project: &str) {
    if let Some(unreleased) = self.unreleased.as_mut() {
      unreleased.retain(|name| name != project);
    }
  }
}

/// File-backed store for one release
#[derive(Debug, Clone)]
pub struct StateStore {
  path: PathBuf,
}

impl StateStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Load the state, or an empty state if the file does not exist yet
  pub fn load(&self) -> ReleaseResult<ReleaseState> {
    if !self.path.exists() {
      tracing::debug!("no state file at {}", self.path.display());
      return Ok(ReleaseState::default());
    }

    let content =
      fs::read_to_string(&self.path).with_context(|| format!("Failed to read {}", self.path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", self.path.display()))
  }

  /// Write the state (temp file, then rename over the old one)
  pub fn save(&self, state: &ReleaseState) -> ReleaseResult<()> {
    let content = to_pretty_json(state)?;

    let file_name = self
      .path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| ".release".to_string());
    let tmp = self.path.with_file_name(format!("{}.tmp", file_name));

    fs::write(&tmp, content).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &self.path).with_context(|| format!("Failed to replace {}", self.path.display()))?;

    tracing::debug!("saved {}", self.path.display());
    Ok(())
  }
}

/// JSON with four-space indentation
fn to_pretty_json(state: &ReleaseState) -> ReleaseResult<String> {
  let mut buffer = Vec::new();
  let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
  let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
  state.serialize(&mut serializer)?;
  buffer.push(b'\n');
  Ok(String::from_utf8_lossy(&buffer).into_owned())
}
