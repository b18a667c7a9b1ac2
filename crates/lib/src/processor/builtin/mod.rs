//! Processors shipped with buildtool.
//!
//! [`ProcessorConfig`] is the serialized form stored in a build
//! configuration, tagged by `kind`:
//!
//! ```toml
//! [[processors]]
//! kind = "application_identifier"
//! identifier = "com.example.game"
//!
//! [[processors]]
//! kind = "icon"
//! path = "Assets/Icons/beta.png"
//! ```

mod build_info;
mod flags;
mod player;
mod signing;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{BuildProcessor, ProcessorTemplate};
use crate::consts::DEFAULT_BUILD_INFO_PATH;

pub use build_info::{AddBuildInfo, BuildInfo};
pub use flags::{DevelopmentBuild, ExportCompliance};
pub use player::{ApplicationIdentifier, Icon, MaxTextureSize, ScriptingDefines};
pub use signing::AndroidSigning;

fn default_build_info_path() -> PathBuf {
  PathBuf::from(DEFAULT_BUILD_INFO_PATH)
}

/// Serialized processor definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessorConfig {
  /// Override the application identifier of the target's group.
  ApplicationIdentifier { identifier: String },

  /// Override the icon of the target's group with a project file.
  Icon { path: PathBuf },

  /// Override the maximum texture size. 0 removes any override.
  MaxTextureSize { size: u32 },

  /// Append scripting define symbols for the target's group.
  ScriptingDefines { symbols: Vec<String> },

  /// Build a development player.
  DevelopmentBuild {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    allow_debugging: bool,
  },

  /// Override the export compliance flags for this build.
  ExportCompliance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uses_non_exempt_encryption: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    add_gradle_wrapper: Option<bool>,
  },

  /// Sign Android builds with a keystore whose passwords live in encrypted storage.
  AndroidSigning {
    keystore: PathBuf,
    alias: String,
    keystore_secret: String,
    alias_secret: String,
  },

  /// Write build metadata into the project before building.
  AddBuildInfo {
    #[serde(default = "default_build_info_path")]
    path: PathBuf,
  },
}

fn default_true() -> bool {
  true
}

impl ProcessorConfig {
  pub fn kind(&self) -> &'static str {
    match self {
      ProcessorConfig::ApplicationIdentifier { .. } => "application_identifier",
      ProcessorConfig::Icon { .. } => "icon",
      ProcessorConfig::MaxTextureSize { .. } => "max_texture_size",
      ProcessorConfig::ScriptingDefines { .. } => "scripting_defines",
      ProcessorConfig::DevelopmentBuild { .. } => "development_build",
      ProcessorConfig::ExportCompliance { .. } => "export_compliance",
      ProcessorConfig::AndroidSigning { .. } => "android_signing",
      ProcessorConfig::AddBuildInfo { .. } => "add_build_info",
    }
  }
}

impl ProcessorTemplate for ProcessorConfig {
  fn instantiate(&self) -> Box<dyn BuildProcessor> {
    match self {
      ProcessorConfig::ApplicationIdentifier { identifier } => Box::new(ApplicationIdentifier::new(identifier)),
      ProcessorConfig::Icon { path } => Box::new(Icon::new(path)),
      ProcessorConfig::MaxTextureSize { size } => Box::new(MaxTextureSize::new(*size)),
      ProcessorConfig::ScriptingDefines { symbols } => Box::new(ScriptingDefines::new(symbols.clone())),
      ProcessorConfig::DevelopmentBuild {
        enabled,
        allow_debugging,
      } => Box::new(DevelopmentBuild::new(*enabled, *allow_debugging)),
      ProcessorConfig::ExportCompliance {
        uses_non_exempt_encryption,
        add_gradle_wrapper,
      } => Box::new(ExportCompliance::new(*uses_non_exempt_encryption, *add_gradle_wrapper)),
      ProcessorConfig::AndroidSigning {
        keystore,
        alias,
        keystore_secret,
        alias_secret,
      } => Box::new(AndroidSigning::new(keystore, alias, keystore_secret, alias_secret)),
      ProcessorConfig::AddBuildInfo { path } => Box::new(AddBuildInfo::new(path)),
    }
  }
}
