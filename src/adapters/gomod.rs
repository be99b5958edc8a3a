//! Go module dependency consistency
//!
//! `make update-release` pins each Go project to the release versions of the
//! foundation modules. If it didn't (a stale go.sum, a missed tag) the release
//! build would silently ship against a development snapshot, so the pinned
//! versions are checked before building.

use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use crate::projects::{Project, ReleaseTier, Registry};
use crate::release::version::{Version, bare};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Module path prefix of every uhppoted Go module
pub const MODULE_PREFIX: &str = "github.com/uhppoted/";

/// `module → version` pairs from go.mod `require` lines (single-line and block form)
pub fn requirements(content: &str) -> ReleaseResult<Vec<(String, String)>> {
  let re = Regex::new(r"^(?:require\s+)?(\S+)\s+(v\S+)")?;

  Ok(
    content
      .lines()
      .filter_map(|line| re.captures(line.trim()))
      .map(|c| (c[1].to_string(), c[2].to_string()))
      .collect(),
  )
}

/// Check a project's go.mod references the release version of every foundation module
///
/// Projects without a go.mod, and development runs, pass trivially.
pub fn verify(project: &Project, registry: &Registry, workspace: &Path, version: &Version) -> ReleaseResult<()> {
  if version.is_development() {
    return Ok(());
  }

  let path = project.root(workspace).join("go.mod");
  if !path.is_file() {
    return Ok(());
  }

  let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
  let required = requirements(&content)?;

  let foundations = registry
    .projects()
    .iter()
    .filter(|p| p.tier == ReleaseTier::Foundation && p.name != project.name);

  for foundation in foundations {
    let module = format!("{}{}", MODULE_PREFIX, foundation.name);
    let expected = version.for_project(&foundation.name);

    let Some((_, found)) = required.iter().find(|(m, _)| *m == module) else {
      continue;
    };

    if found != expected || is_prerelease(found) {
      return Err(ReleaseError::Config(ConfigError::DependencyVersion {
        project: project.name.clone(),
        module,
        found: found.clone(),
        expected: expected.to_string(),
      }));
    }
  }

  Ok(())
}

/// Pre-release and pseudo-versions (`v0.8.9-0.20240101120000-abcdef123456`)
fn is_prerelease(version: &str) -> bool {
  semver::Version::parse(bare(version))
    .map(|v| !v.pre.is_empty())
    .unwrap_or(true)
}
