//! Prepare stage against real git repositories

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_prepare_records_every_stage() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_release_ok(&workspace.path, &["prepare", "--version", "0.8.9"])?;
  assert!(stdout(&output).contains("OK"));

  let state = workspace.state()?;
  assert_eq!(state["unreleased"], serde_json::json!(["alpha", "omega"]));
  for stage in ["changelogs", "readmes", "package-versions", "uncommitted-changes", "prepared"] {
    assert_eq!(state[stage], "ok", "stage {}", stage);
  }
  assert_eq!(state["release-notes"], "not-started");
  assert_eq!(state["published"], "not-started");

  // Pretty-printed with four-space indentation
  let raw = workspace.read_file(&format!(".release-{}", VERSION))?;
  assert!(raw.contains("\n    \"changelogs\": \"ok\""));

  Ok(())
}

#[test]
fn test_prepare_is_default_command() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  run_release_ok(&workspace.path, &["--version", VERSION])?;
  assert_eq!(workspace.state()?["prepared"], "ok");

  Ok(())
}

#[test]
fn test_rerun_skips_completed_stages() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  run_release_ok(&workspace.path, &["prepare", "--version", VERSION])?;
  let before = workspace.state()?;

  // A changelog that would now fail is not re-checked once the stage is ok
  workspace.push_file("alpha", "CHANGELOG.md", "# CHANGELOG\n\n## Unreleased\n")?;

  let output = run_release_ok(&workspace.path, &["prepare", "--version", VERSION])?;
  assert!(!stdout(&output).contains("Starting new release"));
  assert_eq!(workspace.state()?, before);

  Ok(())
}

#[test]
fn test_unreleased_changelog_fails_in_batch_mode() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.push_file(
    "alpha",
    "CHANGELOG.md",
    "# CHANGELOG\n\n## Unreleased\n\n### Added\n1. Something new.\n",
  )?;

  let output = run_release(&workspace.path, &["prepare", "--version", VERSION])?;
  assert_eq!(output.status.code(), Some(3));
  let stderr = stderr(&output);
  assert!(stderr.contains("alpha [changelogs]"), "stderr: {}", stderr);

  // The unreleased set was persisted before the gate failed
  let state = workspace.state()?;
  assert_eq!(state["unreleased"], serde_json::json!(["alpha", "omega"]));
  assert_eq!(state["changelogs"], "not-started");

  Ok(())
}

#[test]
fn test_readme_without_release_row_fails() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.push_file("omega", "README.md", "# omega\n\nMentions v0.8.9 in prose only.\n")?;

  let output = run_release(&workspace.path, &["prepare", "--version", VERSION])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("omega [readmes]"));

  let state = workspace.state()?;
  assert_eq!(state["changelogs"], "ok");
  assert_eq!(state["readmes"], "not-started");

  Ok(())
}

#[test]
fn test_unstaged_changes_block_prepare() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  std::fs::write(workspace.project("alpha").join("README.md"), "# alpha\n\n| v0.8.9 | edited |\n")?;

  let output = run_release(&workspace.path, &["prepare", "--version", VERSION])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("alpha [uncommitted-changes]"));
  assert_eq!(workspace.state()?["prepared"], "not-started");

  Ok(())
}

#[test]
fn test_released_projects_are_skipped() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.tag("alpha", VERSION)?;

  // alpha is already tagged, so its changelog is never looked at
  workspace.push_file("alpha", "CHANGELOG.md", "# CHANGELOG\n\n## Unreleased\n")?;

  run_release_ok(&workspace.path, &["prepare", "--version", VERSION])?;
  let state = workspace.state()?;
  assert_eq!(state["unreleased"], serde_json::json!(["omega"]));
  assert_eq!(state["prepared"], "ok");

  Ok(())
}

#[test]
fn test_development_skips_version_checks() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.push_file("omega", "README.md", "# omega\n")?;

  run_release_ok(&workspace.path, &["prepare"])?;
  let state: serde_json::Value =
    serde_json::from_str(&workspace.read_file(".release-development")?)?;
  assert_eq!(state["readmes"], "ok");
  assert_eq!(state["prepared"], "ok");

  Ok(())
}

#[test]
fn test_bump_refuses_while_projects_unreleased() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_release(&workspace.path, &["prepare,bump", "--version", VERSION])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("have not been released"));

  // Nothing was reset
  let changelog = std::fs::read_to_string(workspace.project("alpha").join("CHANGELOG.md"))?;
  assert!(!changelog.contains("Unreleased"));

  Ok(())
}

#[test]
fn test_interim_and_release_conflict() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_release(&workspace.path, &["--interim", "--release"])?;
  assert!(!output.status.success());
  assert!(!workspace.path.join(".release-development").exists());

  Ok(())
}

#[test]
fn test_missing_explicit_config_is_user_error() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_release(&workspace.path, &["--config", "missing.toml"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Configuration file not found"));

  Ok(())
}
