//! Build targets and the settings groups they belong to.
//!
//! Several ambient settings (application identifier, icons, scripting
//! defines) are stored per [`TargetGroup`] rather than per [`BuildTarget`],
//! so all desktop targets share one identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Platform a configuration builds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTarget {
  StandaloneWindows64,
  StandaloneOsx,
  StandaloneLinux64,
  Ios,
  Android,
  WebGl,
}

/// Group of targets sharing per-platform settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetGroup {
  Standalone,
  Ios,
  Android,
  WebGl,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown build target: {0}")]
pub struct TargetParseError(pub String);

impl BuildTarget {
  pub const ALL: [BuildTarget; 6] = [
    BuildTarget::StandaloneWindows64,
    BuildTarget::StandaloneOsx,
    BuildTarget::StandaloneLinux64,
    BuildTarget::Ios,
    BuildTarget::Android,
    BuildTarget::WebGl,
  ];

  pub fn group(self) -> TargetGroup {
    match self {
      BuildTarget::StandaloneWindows64 | BuildTarget::StandaloneOsx | BuildTarget::StandaloneLinux64 => {
        TargetGroup::Standalone
      }
      BuildTarget::Ios => TargetGroup::Ios,
      BuildTarget::Android => TargetGroup::Android,
      BuildTarget::WebGl => TargetGroup::WebGl,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      BuildTarget::StandaloneWindows64 => "standalone_windows64",
      BuildTarget::StandaloneOsx => "standalone_osx",
      BuildTarget::StandaloneLinux64 => "standalone_linux64",
      BuildTarget::Ios => "ios",
      BuildTarget::Android => "android",
      BuildTarget::WebGl => "web_gl",
    }
  }
}

impl TargetGroup {
  pub fn as_str(self) -> &'static str {
    match self {
      TargetGroup::Standalone => "standalone",
      TargetGroup::Ios => "ios",
      TargetGroup::Android => "android",
      TargetGroup::WebGl => "web_gl",
    }
  }
}

impl fmt::Display for BuildTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl fmt::Display for TargetGroup {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for BuildTarget {
  type Err = TargetParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
    match normalized.as_str() {
      "webgl" => return Ok(BuildTarget::WebGl),
      "windows" | "win64" => return Ok(BuildTarget::StandaloneWindows64),
      "osx" | "macos" => return Ok(BuildTarget::StandaloneOsx),
      "linux" | "linux64" => return Ok(BuildTarget::StandaloneLinux64),
      _ => {}
    }
    BuildTarget::ALL
      .into_iter()
      .find(|target| target.as_str() == normalized)
      .ok_or_else(|| TargetParseError(s.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn standalone_targets_share_a_group() {
    assert_eq!(BuildTarget::StandaloneOsx.group(), TargetGroup::Standalone);
    assert_eq!(BuildTarget::StandaloneWindows64.group(), TargetGroup::Standalone);
    assert_eq!(BuildTarget::Android.group(), TargetGroup::Android);
  }

  #[test]
  fn parses_canonical_names_and_aliases() {
    for target in BuildTarget::ALL {
      assert_eq!(target.as_str().parse::<BuildTarget>(), Ok(target));
    }
    assert_eq!("WebGL".parse::<BuildTarget>(), Ok(BuildTarget::WebGl));
    assert_eq!("macos".parse::<BuildTarget>(), Ok(BuildTarget::StandaloneOsx));
    assert_eq!("Android".parse::<BuildTarget>(), Ok(BuildTarget::Android));
  }

  #[test]
  fn rejects_unknown_target() {
    let err = "playstation".parse::<BuildTarget>().unwrap_err();
    assert_eq!(err, TargetParseError("playstation".to_string()));
  }

  #[test]
  fn serde_uses_snake_case() {
    let json = serde_json::to_string(&BuildTarget::StandaloneLinux64).unwrap();
    assert_eq!(json, "\"standalone_linux64\"");
  }
}
