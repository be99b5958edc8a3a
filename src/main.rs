mod adapters;
mod checks;
mod commands;
mod core;
mod packaging;
mod projects;
mod release;
mod ui;

use clap::Parser;
use crate::commands::Operation;
use crate::core::cancel::{CancelToken, RunOutcome};
use crate::core::config::{ReleaseConfig, load_version_overrides};
use crate::core::context::{ReleaseContext, RunOptions};
use crate::core::error::{ExitCode, ReleaseError, ReleaseResult, print_error};
use crate::release::Version;
use crate::release::version::{DEVELOPMENT, VersionOverrides};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Resumable release orchestration for the uhppoted repositories
#[derive(Parser)]
#[command(name = "uhppoted-release")]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Operations to run, comma separated
  #[arg(value_enum, value_delimiter = ',', default_value = "prepare")]
  commands: Vec<Operation>,

  /// Release version (e.g. v0.8.10), or 'development'
  #[arg(long, default_value = DEVELOPMENT)]
  version: String,

  /// Release version of node-red-contrib-uhppoted
  #[arg(long)]
  node_red: Option<String>,

  /// Release version of uhppoted-app-wild-apricot
  #[arg(long)]
  wild_apricot: Option<String>,

  /// Release version of uhppoted-app-home-assistant
  #[arg(long)]
  home_assistant: Option<String>,

  /// Fail on the first unmet precondition instead of waiting for a fix
  #[arg(long)]
  no_edit: bool,

  /// Interim release: skip the umbrella's uncommitted check and the push wait
  #[arg(long, conflicts_with = "release")]
  interim: bool,

  /// Full release (default)
  #[arg(long)]
  release: bool,

  /// Path to release.toml
  #[arg(long)]
  config: Option<PathBuf>,

  /// Directory containing the project checkouts
  #[arg(long)]
  workspace: Option<PathBuf>,

  /// Verbose diagnostics on stderr
  #[arg(short, long)]
  verbose: bool,

  /// No spoken notifications
  #[arg(long)]
  quiet: bool,
}

fn get_styles() -> clap::builder::Styles {
  let yellow = anstyle::Color::Ansi(anstyle::AnsiColor::Yellow);
  let green = anstyle::Color::Ansi(anstyle::AnsiColor::Green);
  let red = anstyle::Color::Ansi(anstyle::AnsiColor::Red);

  clap::builder::Styles::styled()
    .usage(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .header(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .literal(anstyle::Style::new().fg_color(Some(green)))
    .invalid(anstyle::Style::new().bold().fg_color(Some(red)))
    .error(anstyle::Style::new().bold().fg_color(Some(red)))
    .valid(anstyle::Style::new().bold().underline().fg_color(Some(green)))
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_tracing(verbose: bool) {
  let default = if verbose {
    "uhppoted_release=debug"
  } else {
    "uhppoted_release=warn"
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let cancel = CancelToken::new();
  {
    let token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
      eprintln!("\n⚠️  Interrupted, stopping after the current step");
      token.cancel();
    }) {
      handle_error(e.into(), None);
    }
  }

  let ctx = match build_context(&cli, cancel) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e, None),
  };

  match commands::run_release(&ctx, &cli.commands) {
    Ok(RunOutcome::Completed) => {}
    Ok(RunOutcome::Cancelled) => {
      println!("🛑 Cancelled");
      std::process::exit(ExitCode::Cancelled.as_i32());
    }
    Err(e) => handle_error(e, Some(&ctx)),
  }
}

/// Load config and version overrides, then assemble the run context
fn build_context(cli: &Cli, cancel: CancelToken) -> ReleaseResult<ReleaseContext> {
  let workspace = match &cli.workspace {
    Some(dir) => dir.clone(),
    None => std::env::current_dir().map_err(|e| ReleaseError::message(format!("Failed to get current directory: {}", e)))?,
  };
  tracing::debug!("workspace: {}", workspace.display());

  let config = ReleaseConfig::load(&workspace, cli.config.as_deref())?;

  let overrides = VersionOverrides {
    node_red: cli.node_red.clone(),
    wild_apricot: cli.wild_apricot.clone(),
    home_assistant: cli.home_assistant.clone(),
  }
  .or(load_version_overrides(&workspace)?);
  let version = Version::resolve(&cli.version, overrides.into_exceptions());

  let options = RunOptions {
    no_edit: cli.no_edit,
    interim: cli.interim && !cli.release,
    quiet: cli.quiet,
  };

  ReleaseContext::build(&workspace, &config, version, options, cancel)
}

fn handle_error(err: ReleaseError, ctx: Option<&ReleaseContext>) -> ! {
  print_error(&err);
  if let Some(ctx) = ctx {
    ctx.announce(&format!("ERROR {}", err));
  }
  std::process::exit(err.exit_code().as_i32());
}
