//! Error types for uhppoted-release with contextual messages and exit codes
//!
//! Every fatal condition of a release run is one of a small number of categories:
//! an external command that exited non-zero, a gate check that failed in batch mode,
//! or a configuration inconsistency. Each carries the project it concerns so the
//! final report (and the spoken announcement) names it.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for uhppoted-release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, make, npm, I/O)
  System = 2,
  /// Validation failure (gate checks, checksums, dependency versions)
  Validation = 3,
  /// Interrupted by a signal before the requested stages completed
  Cancelled = 130,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for uhppoted-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors and inconsistencies
  Config(ConfigError),

  /// External command exited non-zero
  Command {
    command: String,
    project: String,
    detail: String,
  },

  /// Release precondition not met (batch mode)
  Gate {
    gate: String,
    project: String,
    message: String,
  },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Tagged failure of an external command
  pub fn command(command: impl Into<String>, project: impl Into<String>, detail: impl Into<String>) -> Self {
    ReleaseError::Command {
      command: command.into(),
      project: project.into(),
      detail: detail.into(),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(ConfigError::NotFound { .. } | ConfigError::Invalid { .. }) => ExitCode::User,
      ReleaseError::Config(_) => ExitCode::Validation,
      ReleaseError::Command { .. } => ExitCode::System,
      ReleaseError::Gate { .. } => ExitCode::Validation,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Gate { gate, .. } => Some(format!(
        "Fix the '{}' precondition and re-run; completed stages are not repeated. Omit --no-edit to wait for the fix instead.",
        gate
      )),
      ReleaseError::Command { command, .. } if command.starts_with("git") => {
        Some("Check the repository state and remote access, then re-run to resume.".to_string())
      }
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Command {
        command,
        project,
        detail,
      } => {
        write!(f, "{}: command '{}' failed", project, command)?;
        if !detail.is_empty() {
          write!(f, "\n{}", detail)?;
        }
        Ok(())
      }
      ReleaseError::Gate { gate, project, message } => write!(f, "{} [{}]: {}", project, gate, message),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<toml_edit::TomlError> for ReleaseError {
  fn from(err: toml_edit::TomlError) -> Self {
    ReleaseError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<regex::Error> for ReleaseError {
  fn from(err: regex::Error) -> Self {
    ReleaseError::message(format!("Regex error: {}", err))
  }
}

impl From<ctrlc::Error> for ReleaseError {
  fn from(err: ctrlc::Error) -> Self {
    ReleaseError::message(format!("Failed to install signal handler: {}", err))
  }
}

/// Configuration-related errors and inconsistencies
#[derive(Debug)]
pub enum ConfigError {
  /// Explicitly requested config file not found
  NotFound { path: PathBuf },

  /// Config file present but unusable
  Invalid { path: PathBuf, reason: String },

  /// Two registry entries share a name
  DuplicateProject { name: String },

  /// Project named on the command line or in state is not in the registry
  UnknownProject { name: String },

  /// A dependency still references a non-release version of a foundation library
  DependencyVersion {
    project: String,
    module: String,
    found: String,
    expected: String,
  },

  /// Standalone and bundled artifacts differ
  ChecksumMismatch {
    project: String,
    artifact: PathBuf,
    bundled: PathBuf,
  },

  /// `bump` requested before every project was released
  NotReleased { projects: Vec<String> },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Pass an existing file with --config, or omit it to use release.toml / the built-in registry.".to_string())
      }
      ConfigError::DependencyVersion { .. } => {
        Some("Run `make update-release` in the project and commit the updated go.mod.".to_string())
      }
      ConfigError::ChecksumMismatch { .. } => {
        Some("Rebuild the project and the umbrella distribution from the same sources.".to_string())
      }
      ConfigError::NotReleased { .. } => Some("Finish the release with the 'release' command first.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Configuration file not found: {}", path.display()),
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
      ConfigError::DuplicateProject { name } => write!(f, "Project '{}' is declared more than once", name),
      ConfigError::UnknownProject { name } => write!(f, "Project '{}' is not in the project registry", name),
      ConfigError::DependencyVersion {
        project,
        module,
        found,
        expected,
      } => write!(
        f,
        "{} has not been updated to the release version of {} (found {}, expected {})",
        project, module, found, expected
      ),
      ConfigError::ChecksumMismatch {
        project,
        artifact,
        bundled,
      } => write!(
        f,
        "{} 'dist' checksums differ: {} vs {}",
        project,
        artifact.display(),
        bundled.display()
      ),
      ConfigError::NotReleased { projects } => {
        write!(f, "Projects {} have not been released", projects.join(", "))
      }
    }
  }
}

/// Result type alias for uhppoted-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
