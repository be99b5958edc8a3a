//! Spoken notifications
//!
//! A release run spends most of its time waiting on a human: an edit, a push, a
//! release landing on GitHub. Each wait is announced so the operator can work
//! elsewhere. Announcements are best effort and never fail the run.

use crate::core::config::NotifyConfig;
use std::process::{Command, Stdio};

/// Built-in pronunciation fixes, applied in order
const SUBSTITUTIONS: &[(&str, &str)] = &[
  ("uhppoted", "u h p p o t e d"),
  ("uhppote", "u h p p o t e"),
  ("nodejs", "node js"),
  ("codegen", "code gen"),
  ("Errno", "error number"),
  ("exe", "e x e"),
  ("unpushed", "un pushed"),
  ("cli", "c l i"),
  ("github", "ggithub"),
  (".10", ".ten"),
];

pub trait Notifier {
  fn announce(&self, message: &str);
}

/// Speaks announcements through an external command (`say` by default)
pub struct SpeechNotifier {
  command: String,
  substitutions: Vec<(String, String)>,
}

impl SpeechNotifier {
  pub fn new(command: impl Into<String>, substitutions: Vec<(String, String)>) -> Self {
    Self {
      command: command.into(),
      substitutions,
    }
  }

  /// Apply the phrase substitutions in order
  pub fn transliterate(&self, message: &str) -> String {
    self
      .substitutions
      .iter()
      .fold(message.to_string(), |acc, (from, to)| acc.replace(from, to))
  }
}

impl Notifier for SpeechNotifier {
  fn announce(&self, message: &str) {
    let spoken = self.transliterate(message);
    tracing::debug!("{} {}", self.command, spoken);

    let result = Command::new(&self.command)
      .arg(&spoken)
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .status();

    match result {
      Ok(status) if !status.success() => tracing::warn!("'{}' exited with {}", self.command, status),
      Err(e) => tracing::warn!("failed to run '{}': {}", self.command, e),
      Ok(_) => {}
    }
  }
}

/// Discards announcements (`--quiet`, or notifications disabled in config)
pub struct Silent;

impl Notifier for Silent {
  fn announce(&self, message: &str) {
    tracing::debug!("(silent) {}", message);
  }
}

/// Build the notifier for a run
pub fn notifier(config: &NotifyConfig, quiet: bool) -> Box<dyn Notifier> {
  if quiet || !config.enabled {
    return Box::new(Silent);
  }

  let substitutions = config.substitutions.clone().unwrap_or_else(|| {
    SUBSTITUTIONS
      .iter()
      .map(|(from, to)| (from.to_string(), to.to_string()))
      .collect()
  });

  Box::new(SpeechNotifier::new(config.command.clone(), substitutions))
}
