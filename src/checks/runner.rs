//! Gate runner
//!
//! Runs one gate over every unreleased project. A pass in which any project
//! fails is repeated from the top once the failure has been remediated, so the
//! gate completes only when every project passed in the same pass.

use super::trait_def::{Gate, GateResult};
use crate::core::cancel::RunOutcome;
use crate::core::context::{GateMode, ReleaseContext};
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::projects::Project;
use std::path::Path;
use std::process::{Command, Stdio};

pub fn run_gate(ctx: &ReleaseContext, gate: &dyn Gate, projects: &[&Project]) -> ReleaseResult<RunOutcome> {
  println!("🔍 Checking {} ({})", gate.description(), ctx.version);

  loop {
    let mut ok = true;

    for project in projects {
      if ctx.cancel.is_cancelled() {
        return Ok(RunOutcome::Cancelled);
      }
      if !gate.applies_to(ctx, project) {
        tracing::debug!(gate = gate.name(), project = %project.name, "not applicable");
        continue;
      }

      let result = gate.check(ctx, project)?;
      if result.passed {
        println!("   ✅ {}", project.name);
        continue;
      }

      ok = false;
      report(project, &result);

      match ctx.mode {
        GateMode::Batch => {
          return Err(ReleaseError::Gate {
            gate: gate.name().to_string(),
            project: project.name.clone(),
            message: result.message,
          });
        }
        GateMode::Interactive => {
          if await_fix(ctx, gate, project)? == RunOutcome::Cancelled {
            return Ok(RunOutcome::Cancelled);
          }
        }
      }
    }

    if ok {
      return Ok(RunOutcome::Completed);
    }
    tracing::debug!(gate = gate.name(), "re-checking after remediation");
  }
}

fn report(project: &Project, result: &GateResult) {
  println!("   ❌ {}: {}", project.name, result.message);
  if let Some(hint) = &result.hint {
    println!();
    for line in hint.lines() {
      println!("      {}", line);
    }
    println!();
  }
}

/// Open the remedy file and block until the gate's watch target changes
fn await_fix(ctx: &ReleaseContext, gate: &dyn Gate, project: &Project) -> ReleaseResult<RunOutcome> {
  let remedy = gate.remedy_file(ctx, project);
  let announcement = format!("{} {}", project.name, waiting_phrase(gate.name()));
  wait_for_change(ctx, remedy.as_deref(), &announcement, || gate.fingerprint(ctx, project))
}

/// Open `file` (if any) in the editor, announce, and poll `fingerprint` until it changes
pub(crate) fn wait_for_change<F>(
  ctx: &ReleaseContext,
  file: Option<&Path>,
  announcement: &str,
  fingerprint: F,
) -> ReleaseResult<RunOutcome>
where
  F: Fn() -> ReleaseResult<String>,
{
  let before = fingerprint()?;

  if let Some(file) = file {
    open_editor(&ctx.settings.editor_command(), file);
  }
  ctx.announce(announcement);

  loop {
    if !ctx.cancel.wait(ctx.settings.poll_interval()) {
      return Ok(RunOutcome::Cancelled);
    }
    let now = fingerprint()?;
    tracing::debug!("fingerprint {} -> {}", before, now);
    if now != before {
      return Ok(RunOutcome::Completed);
    }
  }
}

fn waiting_phrase(gate: &str) -> &'static str {
  match gate {
    "changelogs" => "CHANGELOG has not been updated for release",
    "readmes" => "README has not been updated for release",
    "package-versions" => "package version has not been updated for release",
    "uncommitted-changes" => "has uncommitted changes",
    _ => "needs attention",
  }
}

/// Launch the editor without waiting for it; a missing editor is not fatal
fn open_editor(command: &[String], file: &Path) {
  let Some((program, args)) = command.split_first() else {
    return;
  };

  tracing::debug!("{} {} {}", program, args.join(" "), file.display());
  let spawned = Command::new(program)
    .args(args)
    .arg(file)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn();

  if let Err(e) = spawned {
    println!("   ⚠️  could not open {} in '{}': {}", file.display(), program, e);
  }
}
