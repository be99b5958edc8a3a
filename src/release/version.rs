//! Release version resolution
//!
//! A release has one nominal version plus a small table of exceptions for sibling
//! projects that are versioned independently of the umbrella (the Node-RED nodes,
//! the Wild Apricot integration and the Home Assistant integration).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel version for interim, non-release runs
pub const DEVELOPMENT: &str = "development";

/// Command line names of the independently versioned projects
pub const EXCEPTIONS: &[(&str, &str)] = &[
  ("node-red", "node-red-contrib-uhppoted"),
  ("wild-apricot", "uhppoted-app-wild-apricot"),
  ("home-assistant", "uhppoted-app-home-assistant"),
];

/// Prefix a version with `v` unless it already has one or is `development`
///
/// Anything else is kept verbatim, surrounding whitespace included.
pub fn normalize(version: &str) -> String {
  if version == DEVELOPMENT || version.starts_with('v') {
    version.to_string()
  } else {
    format!("v{}", version)
  }
}

/// Strip the leading `v` for ecosystems that never use it
pub fn bare(version: &str) -> &str {
  version.strip_prefix('v').unwrap_or(version)
}

/// Resolved release version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
  nominal: String,
  exceptions: BTreeMap<String, String>,
}

impl Version {
  /// Resolve a version spec and its per-project exceptions
  pub fn resolve<I, K, V>(spec: &str, exceptions: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
  {
    Self {
      nominal: normalize(spec),
      exceptions: exceptions
        .into_iter()
        .map(|(name, version)| (name.into(), normalize(version.as_ref())))
        .collect(),
    }
  }

  /// Nominal release version
  pub fn nominal(&self) -> &str {
    &self.nominal
  }

  /// Version a given project is released at
  pub fn for_project(&self, name: &str) -> &str {
    self.exceptions.get(name).map(String::as_str).unwrap_or(&self.nominal)
  }

  pub fn exceptions(&self) -> &BTreeMap<String, String> {
    &self.exceptions
  }

  pub fn is_development(&self) -> bool {
    self.nominal == DEVELOPMENT
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.nominal)
  }
}

/// Exception overrides read from a `.versions` file
///
/// ```toml
/// node-red = "1.1.2"
/// wild-apricot = "0.8.9"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VersionOverrides {
  #[serde(default)]
  pub node_red: Option<String>,
  #[serde(default)]
  pub wild_apricot: Option<String>,
  #[serde(default)]
  pub home_assistant: Option<String>,
}

impl VersionOverrides {
  /// Fill unset entries from `other` (CLI flags take precedence over the file)
  pub fn or(self, other: VersionOverrides) -> Self {
    Self {
      node_red: self.node_red.or(other.node_red),
      wild_apricot: self.wild_apricot.or(other.wild_apricot),
      home_assistant: self.home_assistant.or(other.home_assistant),
    }
  }

  /// Project name → version pairs for the overrides that are set
  pub fn into_exceptions(self) -> Vec<(String, String)> {
    let values = [self.node_red, self.wild_apricot, self.home_assistant];
    EXCEPTIONS
      .iter()
      .zip(values)
      .filter_map(|((_, project), version)| version.map(|v| (project.to_string(), v)))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_normalize_prefixes_v() {
    assert_eq!(normalize("1.2.3"), "v1.2.3");
    assert_eq!(normalize("v1.2.3"), "v1.2.3");
    assert_eq!(normalize(&normalize("0.8.7")), "v0.8.7");
  }

  #[test]
  fn test_normalize_keeps_whitespace() {
    assert_eq!(normalize("0.8.10 "), "v0.8.10 ");
    assert_eq!(normalize(" v0.8.10"), "v v0.8.10");
    assert_ne!(normalize(" development"), DEVELOPMENT);
  }

  #[test]
  fn test_development_passes_through() {
    let version = Version::resolve(DEVELOPMENT, Vec::<(String, String)>::new());
    assert_eq!(version.nominal(), "development");
    assert!(version.is_development());
  }

  #[test]
  fn test_for_project_uses_exception() {
    let version = Version::resolve("1.2.3", [("node-red-contrib-uhppoted", "1.1.2")]);

    assert_eq!(version.nominal(), "v1.2.3");
    assert_eq!(version.for_project("node-red-contrib-uhppoted"), "v1.1.2");
    assert_eq!(version.for_project("uhppote-core"), "v1.2.3");
    assert_eq!(version.for_project("not-a-project"), "v1.2.3");
  }

  #[test]
  fn test_for_project_property_over_all_registry_names() {
    let version = Version::resolve("0.8.9", [("uhppoted-app-wild-apricot", "v0.8.10")]);
    for name in crate::projects::Registry::builtin().names() {
      let expected = if name == "uhppoted-app-wild-apricot" { "v0.8.10" } else { "v0.8.9" };
      assert_eq!(version.for_project(&name), expected, "{}", name);
    }
  }

  #[test]
  fn test_bare() {
    assert_eq!(bare("v1.2.3"), "1.2.3");
    assert_eq!(bare("1.2.3"), "1.2.3");
    assert_eq!(bare("development"), "development");
  }

  #[test]
  fn test_overrides_cli_wins_over_file() {
    let cli = VersionOverrides {
      node_red: Some("1.1.3".to_string()),
      ..Default::default()
    };
    let file: VersionOverrides = toml_edit::de::from_str(
      r#"
node-red = "1.1.2"
home-assistant = "0.1.0"
"#,
    )
    .unwrap();

    let exceptions = cli.or(file).into_exceptions();
    assert_eq!(
      exceptions,
      vec![
        ("node-red-contrib-uhppoted".to_string(), "1.1.3".to_string()),
        ("uhppoted-app-home-assistant".to_string(), "0.1.0".to_string()),
      ]
    );
  }
}
