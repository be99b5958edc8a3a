//! Status command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_status_without_state() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = run_release_ok(&workspace.path, &["status", "--version", VERSION])?;
  assert!(stdout(&output).contains("No release in progress"));
  assert!(!workspace.state_path().exists());

  Ok(())
}

#[test]
fn test_status_reports_persisted_stages() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  run_release_ok(&workspace.path, &["prepare", "--version", VERSION])?;

  let output = run_release_ok(&workspace.path, &["status", "--version", VERSION])?;
  let out = stdout(&output);
  assert!(out.contains("alpha, omega"));
  assert!(out.lines().any(|l| l.contains("prepared") && l.contains("ok")));
  assert!(out.lines().any(|l| l.contains("published") && l.contains("not-started")));

  Ok(())
}

#[test]
fn test_status_does_not_run_gates() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.push_file("alpha", "CHANGELOG.md", "# CHANGELOG\n\n## Unreleased\n")?;

  let output = run_release_ok(&workspace.path, &["status", "--version", VERSION])?;
  assert!(output.status.success());
  assert!(!workspace.state_path().exists());

  Ok(())
}
