//! npm package manifest (`package.json`)

use super::PackageManifest;
use crate::core::error::{ReleaseError, ReleaseResult};
use serde::Deserialize;

pub struct PackageJson;

/// package.json structure (minimal fields we care about)
#[derive(Debug, Deserialize)]
struct Manifest {
  #[serde(default)]
  version: Option<String>,
}

impl PackageManifest for PackageJson {
  fn manifest_filename(&self) -> &'static str {
    "package.json"
  }

  fn parse_version(&self, content: &str) -> ReleaseResult<Option<String>> {
    let manifest: Manifest = serde_json::from_str(content)
      .map_err(|e| ReleaseError::message(format!("Failed to parse package.json: {}", e)))?;
    Ok(manifest.version)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_version() {
    let content = r#"{
  "name": "node-red-contrib-uhppoted",
  "version": "1.1.2",
  "dependencies": { "uhppoted": "^0.8.9" }
}"#;
    assert_eq!(PackageJson.parse_version(content).unwrap().as_deref(), Some("1.1.2"));
  }

  #[test]
  fn test_missing_version() {
    assert_eq!(PackageJson.parse_version(r#"{ "name": "x" }"#).unwrap(), None);
  }

  #[test]
  fn test_invalid_json() {
    assert!(PackageJson.parse_version("{ version: ").is_err());
  }
}
