//! Build configurations.
//!
//! A configuration is a TOML file under the project's configuration
//! directory (`BuildConfigs/` by default). The file stem is the
//! configuration name unless `name` is set.
//!
//! ```toml
//! target = "ios"
//! output_path = "build/ios/Game"
//!
//! [flags]
//! strict_mode = true
//!
//! [[processors]]
//! kind = "application_identifier"
//! identifier = "com.example.game"
//! ```
//!
//! # Submodules
//!
//! - [`migrate`] - conversion of legacy modifier records

pub mod migrate;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::builder::PlatformBuilder;
use crate::environment::BuildEnvironment;
use crate::options::BuildFlags;
use crate::processor::{ProcessorConfig, ProcessorTemplate};
use crate::storage::{EncryptedItem, EncryptedStorage};
use crate::target::BuildTarget;
use crate::transaction::{self, BuildArgs, BuildError, BuildOutcome};
use crate::util::fs::write_atomic;

pub use migrate::{LegacyModifier, migrate_legacy_modifiers};

const CONFIG_EXTENSION: &str = "toml";

/// Errors related to reading or writing configurations.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("configuration not found: {0}")]
  NotFound(PathBuf),

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("failed to serialize configuration: {0}")]
  Serialize(#[from] toml::ser::Error),

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// A named, persisted build recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfiguration<P = ProcessorConfig> {
  #[serde(default)]
  pub name: String,

  /// Build output location. Blank means `build/<name>`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output_path: Option<PathBuf>,

  pub target: BuildTarget,

  #[serde(default)]
  pub flags: BuildFlags,

  /// Processors in apply order.
  #[serde(default = "Vec::new")]
  pub processors: Vec<P>,

  /// Records awaiting migration into `processors`.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub legacy_modifiers: Vec<LegacyModifier>,
}

impl<P> BuildConfiguration<P> {
  pub fn new(name: impl Into<String>, target: BuildTarget) -> Self {
    Self {
      name: name.into(),
      output_path: None,
      target,
      flags: BuildFlags::default(),
      processors: Vec::new(),
      legacy_modifiers: Vec::new(),
    }
  }
}

impl<P: ProcessorTemplate> BuildConfiguration<P> {
  /// Run a build transaction for this configuration.
  pub fn build<B>(
    &self,
    env: &mut BuildEnvironment,
    args: &BuildArgs,
    builder: &mut B,
    storage: Option<&dyn EncryptedStorage<EncryptedItem>>,
  ) -> Result<BuildOutcome, BuildError>
  where
    B: PlatformBuilder + ?Sized,
  {
    transaction::run(self, env, args, builder, storage)
  }
}

/// Read a configuration without migrating it.
pub fn read_configuration(path: &Path) -> Result<BuildConfiguration, ConfigError> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ConfigError::NotFound(path.to_path_buf())),
    Err(source) => {
      return Err(ConfigError::Read {
        path: path.to_path_buf(),
        source,
      });
    }
  };

  let mut config: BuildConfiguration = toml::from_str(&content).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })?;

  if config.name.trim().is_empty()
    && let Some(stem) = path.file_stem()
  {
    config.name = stem.to_string_lossy().into_owned();
  }

  debug!(path = %path.display(), name = %config.name, "configuration read");
  Ok(config)
}

/// Read a configuration, migrating legacy modifiers.
///
/// The file is rewritten only if something was migrated.
pub fn load_configuration(path: &Path) -> Result<BuildConfiguration, ConfigError> {
  let mut config = read_configuration(path)?;
  migrate_and_persist(path, &mut config)?;
  Ok(config)
}

/// Migrate legacy modifiers and save the configuration if any were found.
///
/// Returns whether the file was written.
pub fn migrate_and_persist(path: &Path, config: &mut BuildConfiguration) -> Result<bool, ConfigError> {
  let migrated = migrate_legacy_modifiers(config);
  if migrated.is_empty() {
    return Ok(false);
  }
  save_configuration(path, config)?;
  info!(path = %path.display(), count = migrated.len(), "migrated configuration saved");
  Ok(true)
}

/// Write a configuration atomically.
pub fn save_configuration<P: Serialize>(path: &Path, config: &BuildConfiguration<P>) -> Result<(), ConfigError> {
  let content = toml::to_string_pretty(config)?;
  write_atomic(path, content).map_err(|source| ConfigError::Write {
    path: path.to_path_buf(),
    source,
  })
}

/// Configuration files in `dir`, sorted by name.
///
/// A missing directory has no configurations.
pub fn list_configurations(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
    Err(source) => {
      return Err(ConfigError::Read {
        path: dir.to_path_buf(),
        source,
      });
    }
  };

  let mut paths = Vec::new();
  for entry in entries {
    let path = entry
      .map_err(|source| ConfigError::Read {
        path: dir.to_path_buf(),
        source,
      })?
      .path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == CONFIG_EXTENSION) {
      paths.push(path);
    }
  }
  paths.sort();
  Ok(paths)
}
