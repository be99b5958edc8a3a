//! .NET project manifest (`*.csproj`)
//!
//! SDK-style project files declare the package version as a `<Version>` element
//! inside a `<PropertyGroup>`; the first one wins.

use super::PackageManifest;
use crate::core::error::ReleaseResult;
use regex::Regex;

pub struct CsProj;

impl PackageManifest for CsProj {
  fn manifest_filename(&self) -> &'static str {
    "uhppoted.csproj"
  }

  fn parse_version(&self, content: &str) -> ReleaseResult<Option<String>> {
    let re = Regex::new(r"<Version>\s*([^<]*?)\s*</Version>")?;
    Ok(re.captures(content).map(|c| c[1].to_string()))
  }
}
