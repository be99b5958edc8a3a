//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const VERSION: &str = "v0.8.9";

const CONFIG: &str = r#"[settings]
build_tool = "true"

[notify]
enabled = false

[[projects]]
name = "alpha"
folder = "alpha"
branch = "main"
tier = "foundation"

[[projects]]
name = "omega"
folder = "omega"
branch = "main"
tier = "umbrella"
"#;

/// A workspace of project checkouts, each pushed to its own bare origin
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
  origins: PathBuf,
}

impl TestWorkspace {
  /// Workspace with two projects whose changelogs and READMEs are ready for `VERSION`
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("workspace");
    let origins = root.path().join("origins");
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&origins)?;

    std::fs::write(path.join("release.toml"), CONFIG)?;

    let workspace = Self {
      _root: root,
      path,
      origins,
    };
    workspace.add_project("alpha")?;
    workspace.add_project("omega")?;
    Ok(workspace)
  }

  /// Create a project repository with a release-ready changelog and README
  fn add_project(&self, name: &str) -> Result<PathBuf> {
    let origin = self.origins.join(format!("{}.git", name));
    git(&self.origins, &["init", "--bare", "--initial-branch=main", &origin.to_string_lossy()])?;

    let project = self.path.join(name);
    std::fs::create_dir_all(&project)?;
    git(&project, &["init", "--initial-branch=main"])?;
    git(&project, &["config", "user.name", "Test User"])?;
    git(&project, &["config", "user.email", "test@example.com"])?;
    git(&project, &["remote", "add", "origin", &origin.to_string_lossy()])?;

    std::fs::write(
      project.join("CHANGELOG.md"),
      format!(
        "# CHANGELOG\n\n## [{}](https://github.com/uhppoted/{}/releases/tag/{}) - 2024-09-06\n\n### Added\n1. Initial release.\n\n## [v0.8.8] - 2024-03-27\n\n### Updated\n1. Maintenance release.\n",
        VERSION.trim_start_matches('v'),
        name,
        VERSION
      ),
    )?;
    std::fs::write(
      project.join("README.md"),
      format!(
        "# {}\n\n## Release Notes\n\n| *Version* | *Description*       |\n| --------- | ------------------- |\n| {}    | Initial release     |\n",
        name, VERSION
      ),
    )?;

    git(&project, &["add", "."])?;
    git(&project, &["commit", "-m", "Initial commit"])?;
    git(&project, &["push", "-u", "origin", "main"])?;

    Ok(project)
  }

  pub fn project(&self, name: &str) -> PathBuf {
    self.path.join(name)
  }

  /// Overwrite a file in a project and commit it (without pushing)
  pub fn commit_file(&self, project: &str, file: &str, content: &str) -> Result<()> {
    let dir = self.project(project);
    std::fs::write(dir.join(file), content)?;
    git(&dir, &["add", file])?;
    git(&dir, &["commit", "-m", &format!("Update {}", file)])?;
    Ok(())
  }

  /// Overwrite a file in a project, commit and push it
  pub fn push_file(&self, project: &str, file: &str, content: &str) -> Result<()> {
    self.commit_file(project, file, content)?;
    git(&self.project(project), &["push", "origin", "main"])?;
    Ok(())
  }

  /// Tag a project's HEAD and push the tag
  pub fn tag(&self, project: &str, tag: &str) -> Result<()> {
    let dir = self.project(project);
    git(&dir, &["tag", tag])?;
    git(&dir, &["push", "origin", tag])?;
    Ok(())
  }

  pub fn state_path(&self) -> PathBuf {
    self.path.join(format!(".release-{}", VERSION))
  }

  /// Parsed state file
  pub fn state(&self) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(self.state_path()).context("Failed to read state file")?;
    Ok(serde_json::from_str(&content)?)
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run uhppoted-release in batch mode, returning its output whatever the exit status
pub fn run_release(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_uhppoted-release");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .arg("--no-edit")
    .arg("--quiet")
    .env("RUST_LOG", "off")
    .output()
    .context("Failed to run uhppoted-release")
}

/// Run uhppoted-release and fail unless it exits successfully
pub fn run_release_ok(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_release(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "uhppoted-release failed: {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}
