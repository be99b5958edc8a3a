//! Release command implementation

use crate::commands::status::print_state;
use crate::core::cancel::RunOutcome;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::Pipeline;
use clap::ValueEnum;

/// Operations accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
  /// Verify changelogs, READMEs, package versions and working trees, then rebuild
  Prepare,
  /// Cross-compile everything and verify the umbrella's bundled binaries
  Prerelease,
  /// Generate release notes, build and publish each project
  Release,
  /// Reset changelogs and build output for the next development cycle
  Bump,
  /// Show the persisted release state
  Status,
}

/// Run the requested operations
///
/// `prepare` always runs first (it is a no-op once complete); the remaining
/// operations run in the order given, each at most once.
pub fn run_release(ctx: &ReleaseContext, operations: &[Operation]) -> ReleaseResult<RunOutcome> {
  let mut ordered: Vec<Operation> = Vec::new();
  for op in operations {
    if !ordered.contains(op) {
      ordered.push(*op);
    }
  }

  if ordered.iter().all(|op| *op == Operation::Status) {
    return super::run_status(ctx).map(|_| RunOutcome::Completed);
  }

  println!("📦 uhppoted release {}", ctx.version);
  for (project, version) in ctx.version.exceptions() {
    println!("   {:<30} {}", project, version);
  }
  println!();

  let mut pipeline = Pipeline::open(ctx)?;
  if pipeline.prepare()? == RunOutcome::Cancelled {
    return Ok(RunOutcome::Cancelled);
  }

  for op in ordered {
    let outcome = match op {
      Operation::Prepare => RunOutcome::Completed,
      Operation::Prerelease => pipeline.prerelease()?,
      Operation::Release => pipeline.release()?,
      Operation::Bump => pipeline.bump()?,
      Operation::Status => {
        print_state(ctx, pipeline.state());
        RunOutcome::Completed
      }
    };

    if outcome == RunOutcome::Cancelled {
      return Ok(RunOutcome::Cancelled);
    }
  }

  println!();
  println!("✅ OK");
  ctx.announce("OK");
  Ok(RunOutcome::Completed)
}
