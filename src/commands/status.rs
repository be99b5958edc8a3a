//! Status command implementation

use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::{ReleaseState, Stage, StageStatus, StateStore};

/// Print the persisted state of the context's release
pub fn run_status(ctx: &ReleaseContext) -> ReleaseResult<()> {
  let store = StateStore::new(ctx.state_path());
  if !store.path().exists() {
    println!("⚠️  No release in progress for {}", ctx.version);
    println!("   (no state file at {})", store.path().display());
    return Ok(());
  }

  let state = store.load()?;
  print_state(ctx, &state);
  Ok(())
}

pub(crate) fn print_state(ctx: &ReleaseContext, state: &ReleaseState) {
  println!("📋 Release {}", ctx.version);
  println!();

  match &state.unreleased {
    None => println!("   {:<22} not computed", "unreleased"),
    Some(names) if names.is_empty() => println!("   {:<22} (none)", "unreleased"),
    Some(names) => println!("   {:<22} {}", "unreleased", names.join(", ")),
  }

  for stage in Stage::ALL {
    let marker = match state.status(stage) {
      StageStatus::Ok => "✅ ok",
      StageStatus::Unknown => "❓ unknown",
      StageStatus::NotStarted => "⏳ not-started",
    };
    println!("   {:<22} {}", stage.key(), marker);
  }
}
