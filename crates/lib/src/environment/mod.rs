//! Ambient build environment.
//!
//! The environment is the mutable, project-wide state that processors
//! rewrite during a build: version numbers, identifiers, icons, texture
//! overrides and per-build export flags. It is loaded from and saved to
//! `ProjectSettings/BuildEnvironment.json`.
//!
//! # Submodules
//!
//! - [`snapshot`] - capture/restore of ambient settings across a transaction

pub mod snapshot;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::project::ProjectPaths;
use crate::target::{BuildTarget, TargetGroup};
use crate::util::fs::write_atomic;

pub use snapshot::{EnvironmentScope, EnvironmentSnapshot};

/// Errors loading or saving the environment file.
#[derive(Debug, Error)]
pub enum EnvironmentError {
  #[error("failed to read environment file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse environment file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to serialize environment: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("failed to write environment file {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Android keystore fields set while signing.
///
/// Passwords are never written to disk and are redacted from debug output.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AndroidKeystore {
  pub path: Option<PathBuf>,
  pub alias: Option<String>,
  #[serde(skip)]
  pub password: Option<String>,
  #[serde(skip)]
  pub alias_password: Option<String>,
}

impl fmt::Debug for AndroidKeystore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AndroidKeystore")
      .field("path", &self.path)
      .field("alias", &self.alias)
      .field("password", &self.password.as_ref().map(|_| "<redacted>"))
      .field("alias_password", &self.alias_password.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}

/// Player-level settings shared by every build of the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
  /// iOS build number. Kept as a string; may legitimately differ from the
  /// numeric Android code.
  pub ios_build_number: String,
  pub android_bundle_version_code: i32,
  pub application_identifiers: BTreeMap<TargetGroup, String>,
  pub icons: BTreeMap<TargetGroup, PathBuf>,
  pub scripting_defines: BTreeMap<TargetGroup, Vec<String>>,
  /// 0 means no override.
  pub override_max_texture_size: u32,
  pub android_keystore: AndroidKeystore,
}

impl Default for PlayerSettings {
  fn default() -> Self {
    Self {
      ios_build_number: "0".to_string(),
      android_bundle_version_code: 1,
      application_identifiers: BTreeMap::new(),
      icons: BTreeMap::new(),
      scripting_defines: BTreeMap::new(),
      override_max_texture_size: 0,
      android_keystore: AndroidKeystore::default(),
    }
  }
}

/// Per-build export flags, seeded from the tool settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentBuildSettings {
  pub uses_non_exempt_encryption: bool,
  pub add_gradle_wrapper: bool,
}

/// The host project's build environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEnvironment {
  #[serde(skip)]
  pub project_root: PathBuf,
  pub active_target: BuildTarget,
  #[serde(default)]
  pub scenes: Vec<String>,
  #[serde(default)]
  pub player: PlayerSettings,
  #[serde(default)]
  pub current: CurrentBuildSettings,
}

impl BuildEnvironment {
  pub fn new(project_root: impl Into<PathBuf>, active_target: BuildTarget) -> Self {
    Self {
      project_root: project_root.into(),
      active_target,
      scenes: Vec::new(),
      player: PlayerSettings::default(),
      current: CurrentBuildSettings::default(),
    }
  }

  pub fn project(&self) -> ProjectPaths {
    ProjectPaths::new(&self.project_root)
  }

  /// Load the environment file of a project.
  ///
  /// Returns `Ok(None)` if the project has no environment file yet.
  pub fn load(paths: &ProjectPaths) -> Result<Option<Self>, EnvironmentError> {
    let path = paths.environment_file();

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "environment file not found");
        return Ok(None);
      }
      Err(source) => return Err(EnvironmentError::Read { path, source }),
    };

    let mut env: BuildEnvironment =
      serde_json::from_str(&content).map_err(|source| EnvironmentError::Parse { path: path.clone(), source })?;
    env.project_root = paths.root().to_path_buf();

    debug!(path = %path.display(), target = %env.active_target, "environment loaded");
    Ok(Some(env))
  }

  /// Load the environment, or start a fresh one.
  ///
  /// A fresh environment targets `fallback_target` and starts from the
  /// given per-build export flags.
  pub fn load_or_new(
    paths: &ProjectPaths,
    fallback_target: BuildTarget,
    current: CurrentBuildSettings,
  ) -> Result<Self, EnvironmentError> {
    if let Some(env) = Self::load(paths)? {
      return Ok(env);
    }
    debug!(target = %fallback_target, "starting a fresh environment");
    let mut env = Self::new(paths.root(), fallback_target);
    env.current = current;
    Ok(env)
  }

  pub fn save(&self, paths: &ProjectPaths) -> Result<(), EnvironmentError> {
    let path = paths.environment_file();
    let content = serde_json::to_string_pretty(self).map_err(EnvironmentError::Serialize)?;
    write_atomic(&path, content).map_err(|source| EnvironmentError::Write { path: path.clone(), source })?;
    info!(path = %path.display(), "environment saved");
    Ok(())
  }

  pub fn application_identifier(&self, group: TargetGroup) -> Option<&str> {
    self.player.application_identifiers.get(&group).map(String::as_str)
  }

  pub fn set_application_identifier(&mut self, group: TargetGroup, identifier: impl Into<String>) {
    self.player.application_identifiers.insert(group, identifier.into());
  }

  /// Build number as recorded for `target`.
  ///
  /// Android uses the numeric bundle version code, everything else the
  /// string build number.
  pub fn build_number_for(&self, target: BuildTarget) -> String {
    match target {
      BuildTarget::Android => self.player.android_bundle_version_code.to_string(),
      _ => self.player.ios_build_number.clone(),
    }
  }
}
