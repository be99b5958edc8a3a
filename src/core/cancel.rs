//! Cooperative cancellation
//!
//! A single token is created in `main`, handed to the signal handler, and cloned into
//! everything that loops or waits. Nothing is interrupted forcibly: loops check the
//! token between iterations and waits sleep in short slices so they return promptly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const SLICE: Duration = Duration::from_millis(100);

/// Outcome of a cancellable operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
  Completed,
  Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
  flag: Arc<AtomicBool>,
}

impl CancelToken {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.flag.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.flag.load(Ordering::SeqCst)
  }

  /// Sleep for `interval` unless cancelled first
  ///
  /// Returns `false` if the token was cancelled before or during the wait.
  pub fn wait(&self, interval: Duration) -> bool {
    let deadline = Instant::now() + interval;
    loop {
      if self.is_cancelled() {
        return false;
      }
      let now = Instant::now();
      if now >= deadline {
        return true;
      }
      thread::sleep(SLICE.min(deadline - now));
    }
  }
}
