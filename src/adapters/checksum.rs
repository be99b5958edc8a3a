//! Artifact checksum verification
//!
//! The umbrella's combined distribution bundles every sibling's binaries. After a
//! cross-platform build the bundled copy of each binary must be byte-identical to
//! the one the sibling built itself, otherwise the umbrella would ship a stale
//! build. Only the first 64 KiB are hashed; that covers the build ID and version
//! stamp, which is all that differs between stale and fresh builds.

use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use crate::projects::Project;
use crate::release::version::DEVELOPMENT;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Target platforms of `build-all`
pub const PLATFORMS: &[&str] = &["linux", "darwin", "windows", "arm", "arm7"];

const HASHED_PREFIX: u64 = 64 * 1024;

/// SHA-256 (hex) of the first 64 KiB of a file
pub fn digest(path: &Path) -> ReleaseResult<String> {
  let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

  let mut bytes = Vec::new();
  file
    .take(HASHED_PREFIX)
    .read_to_end(&mut bytes)
    .with_context(|| format!("Failed to read {}", path.display()))?;

  let hash = Sha256::digest(&bytes);
  Ok(hash.iter().map(|b| format!("{:02x}", b)).collect())
}

/// Artifact path pair for one platform: (project build, umbrella bundle)
pub fn artifact_paths(
  project: &Project,
  binary: &str,
  umbrella: &Project,
  workspace: &Path,
  version: &str,
  platform: &str,
) -> (PathBuf, PathBuf) {
  let filename = if platform == "windows" {
    format!("{}.exe", binary)
  } else {
    binary.to_string()
  };

  let own = project.root(workspace).join("dist");
  let combined = umbrella.root(workspace).join("dist").join(platform);

  if version == DEVELOPMENT {
    (
      own.join(DEVELOPMENT).join(platform).join(&filename),
      combined.join(DEVELOPMENT).join(&filename),
    )
  } else {
    (
      own.join(format!("{}_{}", project.name, version)).join(platform).join(&filename),
      combined.join(format!("{}_{}", umbrella.name, version)).join(&filename),
    )
  }
}

/// Compare every platform build of a project's binary with the umbrella's copy
///
/// Projects without a binary pass trivially.
pub fn verify(project: &Project, umbrella: &Project, workspace: &Path, version: &str) -> ReleaseResult<()> {
  let Some(binary) = project.binary.as_deref() else {
    return Ok(());
  };

  for platform in PLATFORMS {
    let (own, bundled) = artifact_paths(project, binary, umbrella, workspace, version, platform);
    let own_hash = digest(&own)?;
    let bundled_hash = digest(&bundled)?;
    tracing::debug!("{} {} {}", project.name, own.display(), own_hash);

    if own_hash != bundled_hash {
      println!("   {:<25}  {}  {}", project.name, own.display(), own_hash);
      println!("   {:<25}  {}  {}", "", bundled.display(), bundled_hash);
      return Err(ReleaseError::Config(ConfigError::ChecksumMismatch {
        project: project.name.clone(),
        artifact: own,
        bundled,
      }));
    }
  }

  Ok(())
}
