//! Release preconditions ("gates")
//!
//! Every gate implements the [`Gate`] trait and is run by [`run_gate`] over the
//! unreleased projects, in this order:
//!
//! - **changelogs**: CHANGELOG.md has a heading for the release and no `Unreleased` section
//! - **readmes**: README.md release table names the release version
//! - **package-versions**: npm/Python/.NET manifests declare the release version
//! - **uncommitted-changes**: no unstaged changes to tracked files

pub mod changelog;
pub mod manifest;
pub mod readme;
pub mod runner;
pub mod trait_def;
pub mod uncommitted;

pub use changelog::ChangelogGate;
pub use manifest::ManifestGate;
pub use readme::ReadmeGate;
pub use runner::run_gate;
pub use trait_def::Gate;
pub use uncommitted::UncommittedGate;
