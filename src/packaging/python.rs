//! Python package manifest (`pyproject.toml`)
//!
//! PEP 621 projects declare `[project].version`; Poetry projects use
//! `[tool.poetry].version`. The PEP 621 table wins when both are present.

use super::PackageManifest;
use crate::core::error::ReleaseResult;

pub struct PyProject;

impl PackageManifest for PyProject {
  fn manifest_filename(&self) -> &'static str {
    "pyproject.toml"
  }

  fn parse_version(&self, content: &str) -> ReleaseResult<Option<String>> {
    let doc: toml_edit::DocumentMut = content.parse()?;

    let project = doc
      .get("project")
      .and_then(|p| p.get("version"))
      .and_then(|v| v.as_str());

    let poetry = doc
      .get("tool")
      .and_then(|t| t.get("poetry"))
      .and_then(|p| p.get("version"))
      .and_then(|v| v.as_str());

    Ok(project.or(poetry).map(str::to_string))
  }
}
