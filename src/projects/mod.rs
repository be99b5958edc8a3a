//! Project registry
//!
//! The static catalog of repositories that make up a release. The built-in
//! registry mirrors the uhppoted umbrella checkout: every sibling repository is a
//! subdirectory of the umbrella working tree, and the umbrella itself lives at `.`.
//!
//! Release order is not inferred from `dependencies` (which are informational). It
//! is a fixed priority sequence expressed by [`ReleaseTier`]: foundation libraries
//! first, then every other member, then the umbrella last.

use crate::core::error::{ConfigError, ReleaseResult};
use crate::packaging::Packaging;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Release priority of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseTier {
  /// Libraries every other project builds against
  Foundation,
  /// Ordinary sibling project
  #[default]
  Member,
  /// Aggregating project, released last
  Umbrella,
}

/// Changelog layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangelogStyle {
  /// `# CHANGELOG` banner followed by `## [<version>]` headings
  #[default]
  Versioned,
  /// Free-form changelog without per-version headings
  Plain,
}

/// A single repository in the release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub name: String,
  /// Working tree, relative to the workspace root
  pub folder: PathBuf,
  pub branch: String,
  /// Build artifact name (projects that ship executables)
  #[serde(default)]
  pub binary: Option<String>,
  #[serde(default)]
  pub packaging: Packaging,
  /// Registry package identifier (e.g. the npm package name)
  #[serde(default)]
  pub package: Option<String>,
  #[serde(default)]
  pub dependencies: Vec<String>,
  #[serde(default)]
  pub tier: ReleaseTier,
  #[serde(default)]
  pub changelog: ChangelogStyle,
  /// Whether the README carries a release table worth checking
  #[serde(default = "default_true")]
  pub readme: bool,
  /// Manifest path override, relative to `folder`
  #[serde(default)]
  pub manifest: Option<PathBuf>,
}

fn default_true() -> bool {
  true
}

impl Project {
  fn new(name: &str, folder: &str, branch: &str) -> Self {
    Self {
      name: name.to_string(),
      folder: PathBuf::from(folder),
      branch: branch.to_string(),
      binary: None,
      packaging: Packaging::None,
      package: None,
      dependencies: Vec::new(),
      tier: ReleaseTier::Member,
      changelog: ChangelogStyle::Versioned,
      readme: true,
      manifest: None,
    }
  }

  fn binary(mut self, binary: &str) -> Self {
    self.binary = Some(binary.to_string());
    self
  }

  fn packaged(mut self, packaging: Packaging, package: &str) -> Self {
    self.packaging = packaging;
    self.package = Some(package.to_string());
    self
  }

  fn depends_on(mut self, deps: &[&str]) -> Self {
    self.dependencies = deps.iter().map(|d| d.to_string()).collect();
    self
  }

  fn tier(mut self, tier: ReleaseTier) -> Self {
    self.tier = tier;
    self
  }

  fn plain_changelog(mut self) -> Self {
    self.changelog = ChangelogStyle::Plain;
    self
  }

  fn without_readme(mut self) -> Self {
    self.readme = false;
    self
  }

  /// Absolute working tree for this project
  pub fn root(&self, workspace: &Path) -> PathBuf {
    workspace.join(&self.folder)
  }

  pub fn changelog_path(&self, workspace: &Path) -> PathBuf {
    self.root(workspace).join("CHANGELOG.md")
  }

  pub fn readme_path(&self, workspace: &Path) -> PathBuf {
    self.root(workspace).join("README.md")
  }

  pub fn release_notes_path(&self, workspace: &Path) -> PathBuf {
    self.root(workspace).join("release-notes.md")
  }

  /// Manifest file for the project's packaging kind, if it has one
  pub fn manifest_path(&self, workspace: &Path) -> Option<PathBuf> {
    let file = match &self.manifest {
      Some(path) => path.clone(),
      None => PathBuf::from(self.packaging.manifest_filename()?),
    };
    Some(self.root(workspace).join(file))
  }

  pub fn is_umbrella(&self) -> bool {
    self.tier == ReleaseTier::Umbrella
  }
}

/// Ordered catalog of projects
#[derive(Debug, Clone)]
pub struct Registry {
  projects: Vec<Project>,
}

impl Registry {
  /// Build a registry, rejecting duplicate names
  pub fn from_projects(projects: Vec<Project>) -> ReleaseResult<Self> {
    let mut seen = HashSet::new();
    for project in &projects {
      if !seen.insert(project.name.as_str()) {
        return Err(ConfigError::DuplicateProject {
          name: project.name.clone(),
        }
        .into());
      }
    }

    Ok(Self { projects })
  }

  /// The uhppoted umbrella and its siblings
  pub fn builtin() -> Self {
    use Packaging::{Npm, Python};
    use ReleaseTier::{Foundation, Umbrella};

    const CORE: &[&str] = &["uhppote-core", "uhppoted-lib"];

    let projects = vec![
      Project::new("uhppote-core", "./uhppote-core", "master").tier(Foundation),
      Project::new("uhppoted-lib", "./uhppoted-lib", "master")
        .tier(Foundation)
        .depends_on(&["uhppote-core"]),
      Project::new("uhppote-simulator", "./uhppote-simulator", "main")
        .binary("uhppote-simulator")
        .depends_on(&["uhppote-core"]),
      Project::new("uhppote-cli", "./uhppote-cli", "main")
        .binary("uhppote-cli")
        .depends_on(CORE),
      Project::new("uhppoted-rest", "./uhppoted-rest", "main")
        .binary("uhppoted-rest")
        .depends_on(CORE),
      Project::new("uhppoted-mqtt", "./uhppoted-mqtt", "main")
        .binary("uhppoted-mqtt")
        .depends_on(CORE),
      Project::new("uhppoted-httpd", "./uhppoted-httpd", "main")
        .binary("uhppoted-httpd")
        .depends_on(CORE),
      Project::new("uhppoted-tunnel", "./uhppoted-tunnel", "main")
        .binary("uhppoted-tunnel")
        .depends_on(CORE),
      Project::new("uhppoted-dll", "./uhppoted-dll", "main").depends_on(&["uhppote-core"]),
      Project::new("uhppoted-codegen", "./uhppoted-codegen", "main").binary("uhppoted-codegen"),
      Project::new("uhppoted-app-s3", "./uhppoted-app-s3", "main")
        .binary("uhppoted-app-s3")
        .depends_on(CORE),
      Project::new("uhppoted-app-sheets", "./uhppoted-app-sheets", "main")
        .binary("uhppoted-app-sheets")
        .depends_on(CORE),
      Project::new("uhppoted-app-wild-apricot", "./uhppoted-app-wild-apricot", "main")
        .binary("uhppoted-app-wild-apricot")
        .depends_on(CORE),
      Project::new("uhppoted-app-db", "./uhppoted-app-db", "main")
        .binary("uhppoted-app-db")
        .depends_on(CORE),
      Project::new("uhppoted-app-home-assistant", "./uhppoted-app-home-assistant", "main")
        .packaged(Python, "uhppoted-app-home-assistant")
        .depends_on(&["uhppoted-python"])
        .without_readme(),
      Project::new("uhppoted-nodejs", "./uhppoted-nodejs", "main")
        .packaged(Npm, "uhppoted")
        .without_readme(),
      Project::new("uhppoted-python", "./uhppoted-python", "main")
        .packaged(Python, "uhppoted")
        .without_readme(),
      Project::new("node-red-contrib-uhppoted", "./node-red-contrib-uhppoted", "main")
        .packaged(Npm, "node-red-contrib-uhppoted")
        .depends_on(&["uhppoted-nodejs"])
        .without_readme(),
      Project::new("uhppoted-wiegand", "./uhppoted-wiegand", "main")
        .plain_changelog()
        .without_readme(),
      Project::new("uhppoted", ".", "master").tier(Umbrella).depends_on(&[
        "uhppote-core",
        "uhppoted-lib",
        "uhppote-simulator",
        "uhppote-cli",
        "uhppoted-rest",
        "uhppoted-mqtt",
        "uhppoted-httpd",
        "uhppoted-tunnel",
        "uhppoted-app-s3",
        "uhppoted-app-sheets",
        "uhppoted-app-wild-apricot",
        "uhppoted-app-db",
      ]),
    ];

    Self { projects }
  }

  /// All projects, in registry order
  pub fn projects(&self) -> &[Project] {
    &self.projects
  }

  pub fn get(&self, name: &str) -> Option<&Project> {
    self.projects.iter().find(|p| p.name == name)
  }

  #[cfg(test)]
  pub fn names(&self) -> Vec<String> {
    self.projects.iter().map(|p| p.name.clone()).collect()
  }

  /// The umbrella project, if the registry has one
  pub fn umbrella(&self) -> Option<&Project> {
    self.projects.iter().find(|p| p.is_umbrella())
  }

  /// Resolve names to projects, preserving registry order
  pub fn select(&self, names: &[String]) -> ReleaseResult<Vec<&Project>> {
    for name in names {
      if self.get(name).is_none() {
        return Err(ConfigError::UnknownProject { name: name.clone() }.into());
      }
    }

    Ok(self.projects.iter().filter(|p| names.contains(&p.name)).collect())
  }

  /// Fixed release sequence for the named projects: foundation, members, umbrella
  pub fn release_order(&self, names: &[String]) -> ReleaseResult<Vec<&Project>> {
    let mut selected = self.select(names)?;
    // stable sort keeps registry order within a tier
    selected.sort_by_key(|p| p.tier);
    Ok(selected)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn names(projects: &[&Project]) -> Vec<String> {
    projects.iter().map(|p| p.name.clone()).collect()
  }

  #[test]
  fn test_builtin_names_are_unique() {
    let registry = Registry::builtin();
    assert!(Registry::from_projects(registry.projects().to_vec()).is_ok());
  }

  #[test]
  fn test_builtin_umbrella_is_last_and_at_root() {
    let registry = Registry::builtin();
    let last = registry.projects().last().unwrap();
    assert_eq!(last.name, "uhppoted");
    assert!(last.is_umbrella());
    assert_eq!(last.folder, PathBuf::from("."));
  }

  #[test]
  fn test_duplicate_project_rejected() {
    let projects = vec![
      Project::new("a", "./a", "main"),
      Project::new("a", "./b", "main"),
    ];
    assert!(Registry::from_projects(projects).is_err());
  }

  #[test]
  fn test_release_order_foundation_first_umbrella_last() {
    let registry = Registry::builtin();
    let unreleased = vec![
      "uhppoted".to_string(),
      "uhppote-cli".to_string(),
      "uhppoted-lib".to_string(),
      "uhppoted-rest".to_string(),
      "uhppote-core".to_string(),
    ];

    let order = registry.release_order(&unreleased).unwrap();
    assert_eq!(
      names(&order),
      vec!["uhppote-core", "uhppoted-lib", "uhppote-cli", "uhppoted-rest", "uhppoted"]
    );
  }

  #[test]
  fn test_select_unknown_project() {
    let registry = Registry::builtin();
    assert!(registry.select(&["nope".to_string()]).is_err());
  }

  #[test]
  fn test_manifest_path_follows_packaging() {
    let registry = Registry::builtin();
    let workspace = Path::new("/work");

    let nodejs = registry.get("uhppoted-nodejs").unwrap();
    assert_eq!(
      nodejs.manifest_path(workspace),
      Some(PathBuf::from("/work/./uhppoted-nodejs/package.json"))
    );

    let cli = registry.get("uhppote-cli").unwrap();
    assert_eq!(cli.manifest_path(workspace), None);
  }

  #[test]
  fn test_project_deserializes_with_defaults() {
    let project: Project = toml_edit::de::from_str(
      r#"
name = "demo"
folder = "./demo"
branch = "main"
"#,
    )
    .unwrap();

    assert_eq!(project.tier, ReleaseTier::Member);
    assert_eq!(project.packaging, Packaging::None);
    assert_eq!(project.changelog, ChangelogStyle::Versioned);
    assert!(project.readme);
  }
}
