//! Ecosystem-specific package manifests
//!
//! Each packaging kind declares its version in a different file format. The
//! release pipeline only needs one capability from them: read the declared version.
//! [`Packaging::manifest`] dispatches to the parser for the kind.
//!
//! Currently supports:
//! - npm (`package.json`, JSON `version` field)
//! - Python (`pyproject.toml`, `[project]` or `[tool.poetry]` table)
//! - .NET (`*.csproj`, `<Version>` element)

use crate::core::error::ReleaseResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod dotnet;
pub mod node;
pub mod python;

/// Packaging kind of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Packaging {
  /// No registry package (Go modules, C libraries)
  #[default]
  None,
  Npm,
  Python,
  Dotnet,
}

impl Packaging {
  /// Parser for this kind, `None` for unpackaged projects
  pub fn manifest(&self) -> Option<&'static dyn PackageManifest> {
    match self {
      Packaging::None => None,
      Packaging::Npm => Some(&node::PackageJson),
      Packaging::Python => Some(&python::PyProject),
      Packaging::Dotnet => Some(&dotnet::CsProj),
    }
  }

  /// Default manifest filename for this kind
  pub fn manifest_filename(&self) -> Option<&'static str> {
    self.manifest().map(|m| m.manifest_filename())
  }
}

/// Uniform read access to a package manifest
pub trait PackageManifest: Send + Sync {
  /// Default manifest filename (e.g. "package.json")
  fn manifest_filename(&self) -> &'static str;

  /// Parse the declared version out of manifest content
  ///
  /// `Ok(None)` when the manifest declares no version.
  fn parse_version(&self, content: &str) -> ReleaseResult<Option<String>>;

  /// Read and parse the manifest at `path`
  fn read_version(&self, path: &Path) -> ReleaseResult<Option<String>> {
    let content = std::fs::read_to_string(path)?;
    self.parse_version(&content)
  }
}
