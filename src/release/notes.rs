//! Release notes
//!
//! Two consumers read the latest changelog entry: the GitHub release (via a
//! `release-notes.md` file the project Makefile picks up at publish time) and the
//! README release table, for which a ready-made entry is suggested when the README
//! check fails.

use crate::core::error::{ReleaseResult, ResultExt};
use crate::projects::Project;
use chrono::NaiveDate;
use regex::Regex;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Body used when the latest changelog entry is empty
pub const MAINTENANCE_RELEASE: &str = "Maintenance release for version compatibility.";

/// Latest `## [..]` section of a changelog, heading included
pub fn latest_entry(changelog: &str) -> Option<String> {
  let mut start = None;
  let mut offset = 0;

  for line in changelog.split_inclusive('\n') {
    if line.starts_with("## [") {
      match start {
        None => start = Some(offset),
        Some(begin) => return Some(changelog[begin..offset].trim().to_string()),
      }
    }
    offset += line.len();
  }

  start.map(|begin| changelog[begin..].trim().to_string())
}

/// Body of the latest changelog entry (between its heading and the previous release)
pub fn latest_notes(changelog: &str) -> ReleaseResult<String> {
  let re = Regex::new(r"(?s)##\s+\[(.*?)\](?:.*?)\n(.*?)##\s+\[(.*?)\]")?;

  let notes = match re.captures(changelog) {
    Some(captures) => captures[2].trim().to_string(),
    None => latest_entry(changelog)
      .and_then(|entry| entry.split_once('\n').map(|(_, body)| body.trim().to_string()))
      .unwrap_or_default(),
  };

  if notes.is_empty() {
    Ok(MAINTENANCE_RELEASE.to_string())
  } else {
    Ok(notes)
  }
}

/// `release-notes.md` content for a changelog
pub fn render(changelog: &str) -> ReleaseResult<String> {
  Ok(format!("### Release Notes\n\n{}\n", latest_notes(changelog)?))
}

/// Write `release-notes.md` for a project
///
/// An existing file is kept (it may have been edited by hand). Returns whether a
/// new file was written.
pub fn write(project: &Project, workspace: &Path) -> ReleaseResult<bool> {
  let changelog_path = project.changelog_path(workspace);
  let changelog = fs::read_to_string(&changelog_path)
    .with_context(|| format!("Failed to read {}", changelog_path.display()))?;
  let content = render(&changelog)?;

  let path = project.release_notes_path(workspace);
  let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
    Ok(file) => file,
    Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
    Err(e) => return Err(e).with_context(|| format!("Failed to create {}", path.display())),
  };

  file
    .write_all(content.as_bytes())
    .with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(true)
}

/// Remove `release-notes.md`, if present
pub fn clean(project: &Project, workspace: &Path) -> ReleaseResult<()> {
  let path = project.release_notes_path(workspace);
  match fs::remove_file(&path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
  }
}

/// Suggested README release entry built from the latest changelog entry
pub fn readme_entry(project: &str, version: &str, changelog: &str, today: NaiveDate) -> Option<String> {
  let entry = latest_entry(changelog)?;
  let heading = format!(
    "**[{v}](https://github.com/uhppoted/{project}/releases/tag/{v}) - {today}**",
    v = version,
    project = project,
    today = today.format("%Y-%m-%d"),
  );

  Some(format!("{}\n\n{}\n", heading, entry))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::projects::Registry;
  use tempfile::TempDir;

  const CHANGELOG: &str = "# CHANGELOG

## [0.8.9](https://github.com/uhppoted/uhppote-core/releases/tag/v0.8.9) - 2024-09-06

### Added
1. Added support for the UTO311-L0x `get/set-antipassback` functions.

## [0.8.8](https://github.com/uhppoted/uhppote-core/releases/tag/v0.8.8) - 2024-03-27

### Updated
1. Bumped Go version to 1.22.
";

  #[test]
  fn test_latest_entry() {
    let entry = latest_entry(CHANGELOG).unwrap();
    assert!(entry.starts_with("## [0.8.9]"));
    assert!(entry.ends_with("`get/set-antipassback` functions."));
    assert!(!entry.contains("0.8.8"));
    assert_eq!(latest_entry("# CHANGELOG\n"), None);
  }

  #[test]
  fn test_latest_notes() {
    assert_eq!(
      latest_notes(CHANGELOG).unwrap(),
      "### Added\n1. Added support for the UTO311-L0x `get/set-antipassback` functions."
    );
  }

  #[test]
  fn test_empty_entry_is_maintenance_release() {
    let changelog = "# CHANGELOG\n\n## [0.8.10]\n\n## [0.8.9]\n\n### Added\n1. Stuff\n";
    assert_eq!(latest_notes(changelog).unwrap(), MAINTENANCE_RELEASE);
    assert_eq!(
      render(changelog).unwrap(),
      "### Release Notes\n\nMaintenance release for version compatibility.\n"
    );
  }

  #[test]
  fn test_first_release_has_no_previous_heading() {
    let changelog = "# CHANGELOG\n\n## [0.1.0]\n\n1. Initial release\n";
    assert_eq!(latest_notes(changelog).unwrap(), "1. Initial release");
  }

  #[test]
  fn test_write_keeps_existing_file() {
    let dir = TempDir::new().unwrap();
    let registry = Registry::builtin();
    let project = registry.get("uhppote-core").unwrap();
    fs::create_dir_all(project.root(dir.path())).unwrap();
    fs::write(project.changelog_path(dir.path()), CHANGELOG).unwrap();

    assert!(write(project, dir.path()).unwrap());
    let written = fs::read_to_string(project.release_notes_path(dir.path())).unwrap();
    assert!(written.starts_with("### Release Notes\n\n### Added\n"));

    fs::write(project.release_notes_path(dir.path()), "hand edited").unwrap();
    assert!(!write(project, dir.path()).unwrap());
    assert_eq!(
      fs::read_to_string(project.release_notes_path(dir.path())).unwrap(),
      "hand edited"
    );

    clean(project, dir.path()).unwrap();
    assert!(!project.release_notes_path(dir.path()).exists());
    clean(project, dir.path()).unwrap();
  }

  #[test]
  fn test_readme_entry() {
    let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let entry = readme_entry("uhppote-core", "v0.8.9", CHANGELOG, today).unwrap();
    assert!(entry.starts_with(
      "**[v0.8.9](https://github.com/uhppoted/uhppote-core/releases/tag/v0.8.9) - 2026-10-16**\n\n## [0.8.9]"
    ));
  }
}
