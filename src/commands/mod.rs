//! CLI commands for uhppoted-release
//!
//! - **release**: Run the requested operations (prepare, prerelease, release, bump)
//! - **status**: Show the persisted state of a release
//!
//! All commands accept `&ReleaseContext` to avoid redundant configuration loads.

pub mod release;
pub mod status;

pub use release::{Operation, run_release};
pub use status::run_status;
