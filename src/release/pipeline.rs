//! Resumable release pipeline
//!
//! # Stages
//!
//! ```text
//! prepare:     unreleased-set → changelogs → readmes → package-versions
//!              → uncommitted-changes → prepared → uncommitted-changes
//! prerelease:  build-all                                 (not persisted)
//! release:     release-notes → published (build every release, then
//!              checksum, publish and tag-wait per project in release order)
//! bump:        clean notes, reopen changelogs, remove dist
//! ```
//!
//! A stage runs only if its marker in the state file is not `ok`. The marker is
//! set, and the file rewritten, as soon as the stage completes, so a run that is
//! interrupted (or fails) resumes at the first incomplete stage. Publishing is
//! tracked per project: each project leaves the unreleased set the moment its
//! release lands, and a project whose tag already exists is neither rebuilt nor
//! republished.

use crate::adapters::{BuildTarget, checksum, gomod};
use crate::checks::runner::wait_for_change;
use crate::checks::trait_def::modified;
use crate::checks::{ChangelogGate, Gate, ManifestGate, ReadmeGate, UncommittedGate, run_gate};
use crate::core::cancel::RunOutcome;
use crate::core::context::{GateMode, ReleaseContext};
use crate::core::error::{ConfigError, ReleaseError, ReleaseResult};
use crate::packaging::Packaging;
use crate::projects::Project;
use crate::release::state::{ReleaseState, Stage, StageStatus, StateStore};
use crate::release::{bump, notes};
use crate::ui::progress::ProjectProgress;

/// Bail out of a stage with `RunOutcome::Cancelled`
macro_rules! proceed {
  ($outcome:expr) => {
    if $outcome? == RunOutcome::Cancelled {
      return Ok(RunOutcome::Cancelled);
    }
  };
}

pub struct Pipeline<'a> {
  ctx: &'a ReleaseContext,
  store: StateStore,
  state: ReleaseState,
}

impl<'a> Pipeline<'a> {
  /// Load (or start) the release state for the context's version
  pub fn open(ctx: &'a ReleaseContext) -> ReleaseResult<Self> {
    let store = StateStore::new(ctx.state_path());
    let state = store.load()?;
    if state == ReleaseState::default() {
      println!("📋 Starting new release {}", ctx.version);
      ctx.announce(&format!("starting new release {}", ctx.version));
    }
    Ok(Self { ctx, store, state })
  }

  pub fn state(&self) -> &ReleaseState {
    &self.state
  }

  fn save(&self) -> ReleaseResult<()> {
    self.store.save(&self.state)
  }

  fn mark(&mut self, stage: Stage, status: StageStatus) -> ReleaseResult<()> {
    self.state.set(stage, status);
    self.save()
  }

  /// Unreleased projects in registry order
  fn unreleased(&self) -> ReleaseResult<Vec<&'a Project>> {
    let ctx: &'a ReleaseContext = self.ctx;
    match &self.state.unreleased {
      Some(names) => ctx.registry.select(names),
      None => Ok(Vec::new()),
    }
  }

  fn unreleased_names(&self) -> Vec<String> {
    self.state.unreleased.clone().unwrap_or_default()
  }

  // ==========================================================================
  // prepare
  // ==========================================================================

  /// Stages 1 to 6: verify every precondition and rebuild
  pub fn prepare(&mut self) -> ReleaseResult<RunOutcome> {
    proceed!(self.compute_unreleased());
    proceed!(self.gate_stage(Stage::Changelogs, &ChangelogGate));
    proceed!(self.gate_stage(Stage::Readmes, &ReadmeGate));
    proceed!(self.gate_stage(Stage::PackageVersions, &ManifestGate));
    proceed!(self.gate_stage(Stage::UncommittedChanges, &UncommittedGate));
    proceed!(self.rebuild());
    // `make update` can touch go.mod/go.sum, so re-verify the trees
    proceed!(self.gate_stage(Stage::UncommittedChanges, &UncommittedGate));
    Ok(RunOutcome::Completed)
  }

  fn compute_unreleased(&mut self) -> ReleaseResult<RunOutcome> {
    if self.state.unreleased.is_some() {
      tracing::info!("unreleased set already computed");
      return Ok(RunOutcome::Completed);
    }

    let ctx = self.ctx;
    let projects = ctx.registry.projects();
    println!("🔍 Checking release tags ({})", ctx.version);

    let mut progress = ProjectProgress::new(projects.len(), "Fetching tags");
    let mut unreleased = Vec::new();
    for project in projects {
      if ctx.cancel.is_cancelled() {
        return Ok(RunOutcome::Cancelled);
      }

      let repo = ctx.repo(project);
      ctx.tools.vcs.fetch_tags(&repo)?;
      let tag = ctx.version.for_project(&project.name);
      if ctx.tools.vcs.has_tag(&repo, tag)? {
        tracing::info!(project = %project.name, "{} already released", tag);
      } else {
        unreleased.push(project.name.clone());
      }
      progress.inc();
    }

    if unreleased.is_empty() {
      println!("   ✅ every project has been released");
    } else {
      println!("   📦 unreleased: {}", unreleased.join(", "));
    }

    self.state.unreleased = Some(unreleased);
    self.save()?;
    Ok(RunOutcome::Completed)
  }

  fn gate_stage(&mut self, stage: Stage, gate: &dyn Gate) -> ReleaseResult<RunOutcome> {
    if self.state.is_done(stage) {
      tracing::info!("{} already verified", stage.key());
      return Ok(RunOutcome::Completed);
    }

    let projects = self.unreleased()?;
    proceed!(run_gate(self.ctx, gate, &projects));
    self.mark(stage, StageStatus::Ok)?;
    Ok(RunOutcome::Completed)
  }

  /// Stage 6: checkout, update and build every unreleased project
  fn rebuild(&mut self) -> ReleaseResult<RunOutcome> {
    if self.state.is_done(Stage::Prepared) {
      tracing::info!("projects already rebuilt");
      return Ok(RunOutcome::Completed);
    }

    let ctx = self.ctx;
    println!("🔨 Rebuilding unreleased projects ({})", ctx.version);
    for project in self.unreleased()? {
      if ctx.cancel.is_cancelled() {
        return Ok(RunOutcome::Cancelled);
      }

      println!("   ... {}", project.name);
      let repo = ctx.repo(project);
      ctx.tools.vcs.checkout(&repo, &project.branch)?;
      ctx.tools.build.run(&repo, &BuildTarget::Update)?;
      ctx.tools.build.run(&repo, &BuildTarget::Build)?;
    }

    self.state.set(Stage::Prepared, StageStatus::Ok);
    self.state.set(Stage::UncommittedChanges, StageStatus::Unknown);
    self.save()?;
    Ok(RunOutcome::Completed)
  }

  // ==========================================================================
  // prerelease
  // ==========================================================================

  /// Cross-compile every unreleased project
  pub fn prerelease(&mut self) -> ReleaseResult<RunOutcome> {
    let ctx = self.ctx;
    println!("🔨 Building release candidates ({})", ctx.version);

    for project in self.unreleased()? {
      if ctx.cancel.is_cancelled() {
        return Ok(RunOutcome::Cancelled);
      }
      println!("   ... {}", project.name);
      ctx.tools.build.run(&ctx.repo(project), &BuildTarget::BuildAll)?;
    }

    Ok(RunOutcome::Completed)
  }

  // ==========================================================================
  // release
  // ==========================================================================

  /// Stages 7 and 8: release notes, then build and publish in release order
  pub fn release(&mut self) -> ReleaseResult<RunOutcome> {
    proceed!(self.release_notes());
    proceed!(self.publish_all());
    Ok(RunOutcome::Completed)
  }

  fn release_notes(&mut self) -> ReleaseResult<RunOutcome> {
    if self.state.is_done(Stage::ReleaseNotes) {
      return Ok(RunOutcome::Completed);
    }

    let ctx = self.ctx;
    println!("📝 Generating release notes ({})", ctx.version);
    for project in self.unreleased()? {
      if ctx.cancel.is_cancelled() {
        return Ok(RunOutcome::Cancelled);
      }
      if notes::write(project, &ctx.root)? {
        println!("   ✅ {}", project.name);
      } else {
        println!("   ... keeping existing {}", project.release_notes_path(&ctx.root).display());
      }
    }

    self.mark(Stage::ReleaseNotes, StageStatus::Ok)?;
    Ok(RunOutcome::Completed)
  }

  /// Build every remaining release, then publish them one at a time
  ///
  /// The umbrella's combined distribution is built in the first pass, so every
  /// bundled binary can be verified before its project is published.
  fn publish_all(&mut self) -> ReleaseResult<RunOutcome> {
    if self.state.is_done(Stage::Published) {
      return Ok(RunOutcome::Completed);
    }

    let ctx: &'a ReleaseContext = self.ctx;
    let order = ctx.registry.release_order(&self.unreleased_names())?;

    println!("🔨 Building releases ({})", ctx.version);
    let mut pending = Vec::with_capacity(order.len());
    for project in order {
      if ctx.cancel.is_cancelled() {
        return Ok(RunOutcome::Cancelled);
      }

      // Tagged by an interrupted run: never build or publish it twice
      let tagged = self.is_tagged(project)?;
      if tagged {
        println!("   ... {} already tagged {}", project.name, ctx.version.for_project(&project.name));
      } else {
        self.build_release(project)?;
      }
      pending.push((project, tagged));
    }

    for (project, tagged) in pending {
      if ctx.cancel.is_cancelled() {
        return Ok(RunOutcome::Cancelled);
      }
      proceed!(self.publish(project, tagged));

      self.state.mark_released(&project.name);
      self.save()?;
    }

    self.mark(Stage::Published, StageStatus::Ok)?;
    ctx.announce("all projects have been released");
    Ok(RunOutcome::Completed)
  }

  fn is_tagged(&self, project: &Project) -> ReleaseResult<bool> {
    let ctx = self.ctx;
    let repo = ctx.repo(project);
    ctx.tools.vcs.fetch_tags(&repo)?;
    ctx.tools.vcs.has_tag(&repo, ctx.version.for_project(&project.name))
  }

  fn build_release(&self, project: &Project) -> ReleaseResult<()> {
    let ctx = self.ctx;
    let repo = ctx.repo(project);
    let version = ctx.version.for_project(&project.name);

    println!("   ... {} ({})", project.name, version);
    ctx.tools.build.run(&repo, &BuildTarget::UpdateRelease)?;
    gomod::verify(project, &ctx.registry, &ctx.root, &ctx.version)?;
    ctx.tools.build.run(&repo, &BuildTarget::release(&project.name, version))
  }

  fn publish(&self, project: &Project, tagged: bool) -> ReleaseResult<RunOutcome> {
    let ctx = self.ctx;
    let repo = ctx.repo(project);
    let vcs = &ctx.tools.vcs;
    let version = ctx.version.for_project(&project.name);

    println!("🚀 Releasing {} ({})", project.name, version);

    if !tagged {
      if let Some(umbrella) = ctx.registry.umbrella().filter(|u| u.name != project.name) {
        checksum::verify(project, umbrella, &ctx.root, version)?;
      }

      if !ctx.exempt_uncommitted(project) {
        vcs.remote_update(&repo)?;
        if vcs.status(&repo)?.unstaged {
          return Err(ReleaseError::Gate {
            gate: "uncommitted-changes".to_string(),
            project: project.name.clone(),
            message: format!("{} has uncommitted changes", project.name),
          });
        }
      }

      if !ctx.interim {
        proceed!(self.wait_until(project, "has unpushed changes", || {
          vcs.remote_update(&repo)?;
          Ok(vcs.status(&repo)?.up_to_date)
        }));
      }

      ctx.tools.build.run(&repo, &BuildTarget::publish(&project.name, version))?;
      proceed!(self.wait_until(project, "is waiting for release on github", || {
        vcs.fetch_tags(&repo)?;
        vcs.has_tag(&repo, version)
      }));
    }

    if project.packaging == Packaging::Npm {
      let package = project.package.as_deref().unwrap_or(&project.name);
      if !ctx.tools.packages.published(&repo, package, version)? {
        ctx.tools.build.run(&repo, &BuildTarget::PublishNpm)?;
        proceed!(self.wait_until(project, "is waiting for release on npm", || {
          ctx.tools.packages.published(&repo, package, version)
        }));
        ctx.announce(&format!("{} has been published to npm", project.name));
      }
    }

    println!("   ✅ {} released", project.name);
    Ok(RunOutcome::Completed)
  }

  /// Poll `done` at the publish interval until it holds
  fn wait_until<F>(&self, project: &Project, waiting: &str, done: F) -> ReleaseResult<RunOutcome>
  where
    F: Fn() -> ReleaseResult<bool>,
  {
    if done()? {
      return Ok(RunOutcome::Completed);
    }

    let ctx = self.ctx;
    println!("   ... {} {}", project.name, waiting);
    ctx.announce(&format!("{} {}", project.name, waiting));

    loop {
      if !ctx.cancel.wait(ctx.settings.publish_poll_interval()) {
        return Ok(RunOutcome::Cancelled);
      }
      if done()? {
        return Ok(RunOutcome::Completed);
      }
    }
  }

  // ==========================================================================
  // bump
  // ==========================================================================

  /// Stage 9: reset every project for the next development cycle
  pub fn bump(&mut self) -> ReleaseResult<RunOutcome> {
    let ctx = self.ctx;
    match &self.state.unreleased {
      Some(names) if names.is_empty() => {}
      Some(names) => {
        return Err(ReleaseError::Config(ConfigError::NotReleased {
          projects: names.clone(),
        }));
      }
      None => {
        return Err(ReleaseError::with_help(
          "The unreleased project set has not been computed",
          "Run 'prepare' for this version first.",
        ));
      }
    }

    for project in ctx.registry.projects() {
      if ctx.cancel.is_cancelled() {
        return Ok(RunOutcome::Cancelled);
      }

      println!("⏫ Bumping {}", project.name);
      notes::clean(project, &ctx.root)?;
      if project.changelog_path(&ctx.root).exists() && bump::bump_changelog(project, &ctx.root)? {
        println!("   ... added 'Unreleased' to CHANGELOG.md");
      }
      bump::remove_dist(project, &ctx.root)?;

      if ctx.mode == GateMode::Interactive
        && let Some(manifest) = project.manifest_path(&ctx.root).filter(|p| p.exists())
      {
        let announcement = format!("{} package version needs to be bumped", project.name);
        proceed!(wait_for_change(ctx, Some(manifest.as_path()), &announcement, || {
          Ok(modified(&manifest))
        }));
      }
    }

    Ok(RunOutcome::Completed)
  }
}
