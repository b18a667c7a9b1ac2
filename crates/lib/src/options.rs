//! Options handed to the external builder.
//!
//! `BuildOptions` is folded through every applied processor before the
//! builder sees it. The final value is passed to the builder unmodified.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::target::BuildTarget;

/// Flags controlling how the external builder compiles and packages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildFlags {
  pub development: bool,
  pub allow_debugging: bool,
  pub compress_with_lz4: bool,
  pub strict_mode: bool,
  pub clean_build_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
  /// Where the build output is written.
  pub output_path: PathBuf,
  pub target: BuildTarget,
  pub flags: BuildFlags,
  /// Scenes/assets included in the build, in order.
  pub scenes: Vec<String>,
}

impl BuildOptions {
  pub fn new(output_path: impl Into<PathBuf>, target: BuildTarget) -> Self {
    Self {
      output_path: output_path.into(),
      target,
      flags: BuildFlags::default(),
      scenes: Vec::new(),
    }
  }
}
