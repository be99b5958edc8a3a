//! Release orchestration
//!
//! A release walks every project in the registry through a fixed sequence of
//! stages (see [`pipeline`]). Progress is persisted per target version by
//! [`state`], so the same command can be re-run until the release is complete.
//!
//! - **version**: Nominal release version plus per-project exceptions
//! - **state**: `.release-<version>` record of completed stages
//! - **pipeline**: Stage controller for prepare / prerelease / release / bump
//! - **notes**: Release notes and README entries from the changelog
//! - **bump**: Post-release reset of changelogs and build output

pub mod bump;
pub mod notes;
pub mod pipeline;
pub mod state;
pub mod version;

pub use pipeline::Pipeline;
pub use state::{ReleaseState, Stage, StageStatus, StateStore};
pub use version::Version;
