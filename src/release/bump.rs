//! Post-release housekeeping
//!
//! After every project has been published, each working tree is reset for the
//! next development cycle: the generated release notes go, the changelog gets a
//! fresh `## Unreleased` section and the release build output is removed.

use crate::core::error::{ReleaseResult, ResultExt};
use crate::projects::Project;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Insert `## Unreleased` after the changelog banner
///
/// `None` when the changelog already has an `Unreleased` section.
pub fn insert_unreleased(changelog: &str) -> Option<String> {
  if changelog.contains("Unreleased") {
    return None;
  }

  let (heading, rest) = changelog.split_once('\n').unwrap_or((changelog, ""));
  let rest = rest.split_once('\n').map(|(_, after)| after).unwrap_or("");

  Some(format!("{}\n\n## Unreleased\n\n\n{}", heading, rest))
}

/// Rewrite a project's changelog with an `Unreleased` section
///
/// Returns whether the file changed.
pub fn bump_changelog(project: &Project, workspace: &Path) -> ReleaseResult<bool> {
  let path = project.changelog_path(workspace);
  let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;

  let Some(bumped) = insert_unreleased(&content) else {
    return Ok(false);
  };

  let tmp = path.with_extension("md.tmp");
  fs::write(&tmp, bumped).with_context(|| format!("Failed to write {}", tmp.display()))?;
  fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {}", path.display()))?;
  Ok(true)
}

/// Remove a project's `dist/` build output
pub fn remove_dist(project: &Project, workspace: &Path) -> ReleaseResult<()> {
  let dist = project.root(workspace).join("dist");
  match fs::remove_dir_all(&dist) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e).with_context(|| format!("Failed to remove {}", dist.display())),
  }
}
