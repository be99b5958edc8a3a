//! Package manifest version precondition

use super::trait_def::{Gate, GateResult, WatchTarget};
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::projects::Project;
use crate::release::version::bare;

pub struct ManifestGate;

impl Gate for ManifestGate {
  fn name(&self) -> &'static str {
    "package-versions"
  }

  fn description(&self) -> &'static str {
    "package manifest version matches release"
  }

  fn applies_to(&self, ctx: &ReleaseContext, project: &Project) -> bool {
    !ctx.version.is_development()
      && project
        .manifest_path(&ctx.root)
        .is_some_and(|path| path.exists())
  }

  fn check(&self, ctx: &ReleaseContext, project: &Project) -> ReleaseResult<GateResult> {
    let (Some(manifest), Some(path)) = (project.packaging.manifest(), project.manifest_path(&ctx.root)) else {
      return Ok(GateResult::pass());
    };

    let expected = ctx.version.for_project(&project.name);
    let declared = match manifest.read_version(&path) {
      Ok(declared) => declared,
      Err(e) => {
        return Ok(GateResult::fail(format!(
          "{} could not be parsed: {}",
          manifest.manifest_filename(),
          e
        )));
      }
    };

    Ok(match declared {
      Some(declared) if bare(&declared) == bare(expected) => GateResult::pass(),
      Some(declared) => GateResult::fail(format!(
        "{} declares version {}, expected {}",
        manifest.manifest_filename(),
        declared,
        bare(expected)
      )),
      None => GateResult::fail(format!("{} does not declare a version", manifest.manifest_filename())),
    })
  }

  fn watch_target(&self, ctx: &ReleaseContext, project: &Project) -> WatchTarget {
    WatchTarget::File(
      project
        .manifest_path(&ctx.root)
        .unwrap_or_else(|| project.root(&ctx.root)),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::cancel::CancelToken;
  use crate::core::config::ReleaseConfig;
  use crate::core::context::RunOptions;
  use crate::release::Version;
  use std::fs;
  use std::path::Path;
  use tempfile::TempDir;

  const NODE_RED: &str = "name = \"node-red-contrib-uhppoted\"\nfolder = \"./node-red-contrib-uhppoted\"\nbranch = \"main\"\npackaging = \"npm\"\npackage = \"node-red-contrib-uhppoted\"\n";

  fn context(dir: &Path, version: &str) -> ReleaseContext {
    let mut config = ReleaseConfig::default();
    config.projects = vec![toml_edit::de::from_str(NODE_RED).unwrap()];
    config.notify.enabled = false;
    let options = RunOptions {
      no_edit: true,
      ..Default::default()
    };
    let version = Version::resolve(version, Vec::<(String, String)>::new());
    ReleaseContext::build(dir, &config, version, options, CancelToken::new()).unwrap()
  }

  fn write_manifest(dir: &Path, content: &str) {
    let root = dir.join("node-red-contrib-uhppoted");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("package.json"), content).unwrap();
  }

  #[test]
  fn test_matching_version_passes() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), r#"{ "name": "node-red-contrib-uhppoted", "version": "0.8.9" }"#);
    let ctx = context(dir.path(), "v0.8.9");
    let project = ctx.registry.get("node-red-contrib-uhppoted").unwrap();

    assert!(ManifestGate.applies_to(&ctx, project));
    assert!(ManifestGate.check(&ctx, project).unwrap().passed);
  }

  #[test]
  fn test_stale_version_fails() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), r#"{ "version": "0.8.8" }"#);
    let ctx = context(dir.path(), "v0.8.9");
    let project = ctx.registry.get("node-red-contrib-uhppoted").unwrap();

    let result = ManifestGate.check(&ctx, project).unwrap();
    assert!(!result.passed);
    assert_eq!(result.message, "package.json declares version 0.8.8, expected 0.8.9");
  }

  #[test]
  fn test_malformed_manifest_fails_gate() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), r#"{ "name": "node-red-contrib-uhppoted", "vers"#);
    let ctx = context(dir.path(), "v0.8.9");
    let project = ctx.registry.get("node-red-contrib-uhppoted").unwrap();

    let result = ManifestGate.check(&ctx, project).unwrap();
    assert!(!result.passed);
    assert!(result.message.starts_with("package.json could not be parsed"), "{}", result.message);
  }

  #[test]
  fn test_development_skips_manifest() {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), r#"{ "version": "0.8.8" }"#);
    let ctx = context(dir.path(), "development");
    let project = ctx.registry.get("node-red-contrib-uhppoted").unwrap();

    assert!(!ManifestGate.applies_to(&ctx, project));
  }
}
