//! Release context - build once, pass everywhere
//!
//! Everything a stage needs that is not the release state itself: the workspace,
//! the registry, the resolved version, run-wide settings, the external tools and
//! the cancellation token. Built once in `main` and passed by reference.

use crate::adapters::{BuildTool, Make, Npm, PackageRegistry};
use crate::core::cancel::CancelToken;
use crate::core::config::{ReleaseConfig, Settings};
use crate::core::error::ReleaseResult;
use crate::core::vcs::{Repo, SystemGit, Vcs};
use crate::projects::{Project, Registry};
use crate::release::version::Version;
use crate::ui::notify::{self, Notifier};
use std::path::{Path, PathBuf};

/// How gate failures are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
  /// Open the editor and wait for the fix
  Interactive,
  /// Fail immediately (`--no-edit`)
  Batch,
}

/// Run options from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
  pub no_edit: bool,
  pub interim: bool,
  pub quiet: bool,
}

/// External collaborators
pub struct Tools {
  pub vcs: Box<dyn Vcs>,
  pub build: Box<dyn BuildTool>,
  pub packages: Box<dyn PackageRegistry>,
}

impl Tools {
  /// System git, the configured build tool and npm
  pub fn system(settings: &Settings) -> Self {
    Self {
      vcs: Box::new(SystemGit::new()),
      build: Box::new(Make::new(settings.build_tool.clone())),
      packages: Box::new(Npm::new(settings.npm.clone())),
    }
  }
}

pub struct ReleaseContext {
  /// Workspace root (the umbrella checkout)
  pub root: PathBuf,
  pub settings: Settings,
  pub registry: Registry,
  pub version: Version,
  pub mode: GateMode,
  /// Interim release: the umbrella may carry unpushed or uncommitted work
  pub interim: bool,
  pub cancel: CancelToken,
  pub notifier: Box<dyn Notifier>,
  pub tools: Tools,
}

impl ReleaseContext {
  pub fn build(
    root: &Path,
    config: &ReleaseConfig,
    version: Version,
    options: RunOptions,
    cancel: CancelToken,
  ) -> ReleaseResult<Self> {
    Ok(Self {
      root: root.to_path_buf(),
      settings: config.settings.clone(),
      registry: config.registry()?,
      version,
      mode: if options.no_edit {
        GateMode::Batch
      } else {
        GateMode::Interactive
      },
      interim: options.interim,
      cancel,
      notifier: notify::notifier(&config.notify, options.quiet),
      tools: Tools::system(&config.settings),
    })
  }

  /// Replace the external tools (tests)
  pub fn with_tools(mut self, tools: Tools) -> Self {
    self.tools = tools;
    self
  }

  pub fn repo(&self, project: &Project) -> Repo {
    Repo::of(project, &self.root)
  }

  /// `<state_dir>/.release-<nominal version>`
  pub fn state_path(&self) -> PathBuf {
    self
      .root
      .join(&self.settings.state_dir)
      .join(format!(".release-{}", self.version.nominal()))
  }

  /// Projects skipped by the uncommitted-changes check
  pub fn exempt_uncommitted(&self, project: &Project) -> bool {
    self.settings.exempt_uncommitted.contains(&project.name) || (self.interim && project.is_umbrella())
  }

  pub fn announce(&self, message: &str) {
    self.notifier.announce(message);
  }
}
