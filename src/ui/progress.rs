//! Progress indicators for long-running scans
//!
//! Uses `linya` bars. Only the unreleased-set scan uses one: it touches the remote
//! of every project and is the slowest silent stretch of a run.

use linya::{Bar, Progress};

/// Single-bar progress over the project list
pub struct ProjectProgress {
  progress: Progress,
  bar: Bar,
}

impl ProjectProgress {
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self { progress, bar }
  }

  /// Increment progress by 1
  pub fn inc(&mut self) {
    self.progress.inc_and_draw(&self.bar, 1);
  }
}
