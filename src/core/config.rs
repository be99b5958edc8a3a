use crate::checks::readme::ReadmeRule;
use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use crate::projects::{Project, Registry};
use crate::release::version::VersionOverrides;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-workspace version exception file
pub const VERSIONS_FILE: &str = ".versions";

/// Configuration for uhppoted-release
/// Searched in order: release.toml, .release.toml, .config/release.toml
///
/// Every field has a default, so a workspace without a config file gets the
/// built-in registry and the stock tool names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseConfig {
  #[serde(default)]
  pub settings: Settings,
  #[serde(default)]
  pub notify: NotifyConfig,
  /// Replaces the built-in registry when non-empty
  #[serde(default)]
  pub projects: Vec<Project>,
}

/// Run-wide settings passed to every stage
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// Editor command line (split on whitespace, file path appended)
  #[serde(default)]
  pub editor: Option<String>,

  #[serde(default = "default_build_tool")]
  pub build_tool: String,

  #[serde(default = "default_npm")]
  pub npm: String,

  /// Seconds between fingerprint checks while waiting for an edit
  #[serde(default = "default_poll_interval")]
  pub poll_interval_secs: u64,

  /// Seconds between checks while waiting for a push or publish to land
  #[serde(default = "default_publish_poll_interval")]
  pub publish_poll_interval_secs: u64,

  #[serde(default)]
  pub readme_rule: ReadmeRule,

  /// Directory holding the `.release-<version>` state files, relative to the workspace
  #[serde(default = "default_state_dir")]
  pub state_dir: PathBuf,

  /// Projects never checked for uncommitted changes
  #[serde(default)]
  pub exempt_uncommitted: Vec<String>,
}

fn default_build_tool() -> String {
  "make".to_string()
}

fn default_npm() -> String {
  "npm".to_string()
}

fn default_poll_interval() -> u64 {
  1
}

fn default_publish_poll_interval() -> u64 {
  10
}

fn default_state_dir() -> PathBuf {
  PathBuf::from(".")
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      editor: None,
      build_tool: default_build_tool(),
      npm: default_npm(),
      poll_interval_secs: default_poll_interval(),
      publish_poll_interval_secs: default_publish_poll_interval(),
      readme_rule: ReadmeRule::default(),
      state_dir: default_state_dir(),
      exempt_uncommitted: Vec::new(),
    }
  }
}

impl Settings {
  pub fn poll_interval(&self) -> Duration {
    Duration::from_secs(self.poll_interval_secs)
  }

  pub fn publish_poll_interval(&self) -> Duration {
    Duration::from_secs(self.publish_poll_interval_secs)
  }

  /// Editor command line: configured, then $VISUAL / $EDITOR, then Sublime Text
  pub fn editor_command(&self) -> Vec<String> {
    let line = self
      .editor
      .clone()
      .or_else(|| std::env::var("VISUAL").ok())
      .or_else(|| std::env::var("EDITOR").ok())
      .filter(|e| !e.trim().is_empty())
      .unwrap_or_else(|| "subl".to_string());

    line.split_whitespace().map(str::to_string).collect()
  }
}

/// Spoken notification settings
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
  #[serde(default = "default_notify_enabled")]
  pub enabled: bool,

  #[serde(default = "default_notify_command")]
  pub command: String,

  /// Phrase substitutions applied before speaking (built-in list when unset)
  #[serde(default)]
  pub substitutions: Option<Vec<(String, String)>>,
}

fn default_notify_enabled() -> bool {
  true
}

fn default_notify_command() -> String {
  "say".to_string()
}

impl Default for NotifyConfig {
  fn default() -> Self {
    Self {
      enabled: default_notify_enabled(),
      command: default_notify_command(),
      substitutions: None,
    }
  }
}

impl ReleaseConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load the config for a workspace
  ///
  /// An explicit path must exist. Without one, a missing file yields the defaults.
  pub fn load(workspace: &Path, explicit: Option<&Path>) -> ReleaseResult<Self> {
    let path = match explicit {
      Some(path) if !path.exists() => {
        return Err(ReleaseError::Config(ConfigError::NotFound {
          path: path.to_path_buf(),
        }));
      }
      Some(path) => path.to_path_buf(),
      None => match Self::find_config_path(workspace) {
        Some(path) => path,
        None => {
          tracing::debug!("no config file under {}, using defaults", workspace.display());
          return Ok(Self::default());
        }
      },
    };

    tracing::debug!("loading config from {}", path.display());
    let content =
      fs::read_to_string(&path).with_context(|| format!("Failed to read config from {}", path.display()))?;
    Self::parse(&content, &path)
  }

  fn parse(content: &str, path: &Path) -> ReleaseResult<Self> {
    let config: ReleaseConfig = toml_edit::de::from_str(content).map_err(|e| {
      ReleaseError::Config(ConfigError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
      })
    })?;

    if config.settings.poll_interval_secs == 0 || config.settings.publish_poll_interval_secs == 0 {
      return Err(ReleaseError::Config(ConfigError::Invalid {
        path: path.to_path_buf(),
        reason: "poll intervals must be at least one second".to_string(),
      }));
    }

    Ok(config)
  }

  /// Registry for this run: configured projects, or the built-in catalog
  pub fn registry(&self) -> ReleaseResult<Registry> {
    if self.projects.is_empty() {
      Ok(Registry::builtin())
    } else {
      Registry::from_projects(self.projects.clone())
    }
  }
}

/// Read version exceptions from the workspace `.versions` file, if present
pub fn load_version_overrides(workspace: &Path) -> ReleaseResult<VersionOverrides> {
  let path = workspace.join(VERSIONS_FILE);
  if !path.exists() {
    return Ok(VersionOverrides::default());
  }

  let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
  toml_edit::de::from_str(&content).map_err(|e| {
    ReleaseError::Config(ConfigError::Invalid {
      path,
      reason: e.to_string(),
    })
  })
}
