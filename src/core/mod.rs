//! Core building blocks shared by every stage
//!
//! - **cancel**: Cooperative cancellation token set by the signal handler
//! - **config**: `release.toml` and `.versions` parsing
//! - **context**: Release context built once per run
//! - **error**: Error types with contextual help messages and exit codes
//! - **vcs**: Git operations abstraction (SystemGit)

pub mod cancel;
pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
