//! Project-wide tool settings.
//!
//! Stored at `ProjectSettings/BuildToolSettings.toml`. Projects that still
//! carry the older `BuildToolSettings.json` have it imported on the next
//! load: its values are laid over the current settings, the TOML file is
//! written and the JSON file deleted.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{BUILD_NUMBER_ARG, DEFAULT_CONFIG_DIR};
use crate::environment::CurrentBuildSettings;
use crate::project::ProjectPaths;
use crate::transaction::BuildArgs;
use crate::util::fs::{remove_if_exists, write_atomic};

#[derive(Debug, Error)]
pub enum SettingsError {
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

  #[error("failed to parse legacy settings {path}: {source}")]
  ParseLegacy {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to serialize settings: {0}")]
  Serialize(#[from] toml::ser::Error),

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// External builder process used by `bt build`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderSettings {
  pub program: Option<String>,
  pub args: Vec<String>,
  pub timeout_minutes: u64,
  pub report_grace_seconds: u64,
}

impl Default for BuilderSettings {
  fn default() -> Self {
    Self {
      program: None,
      args: Vec::new(),
      timeout_minutes: 60,
      report_grace_seconds: 5,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
  /// Directory holding build configurations, relative to the project root.
  pub default_config_dir: String,
  /// Arguments used for builds started without any.
  pub local_build_arguments: Vec<String>,
  pub uses_non_exempt_encryption: bool,
  pub add_gradle_wrapper: bool,
  pub builder: BuilderSettings,
}

impl Default for ToolSettings {
  fn default() -> Self {
    Self {
      default_config_dir: DEFAULT_CONFIG_DIR.to_string(),
      local_build_arguments: vec![BUILD_NUMBER_ARG.to_string(), "0001".to_string()],
      uses_non_exempt_encryption: false,
      add_gradle_wrapper: false,
      builder: BuilderSettings::default(),
    }
  }
}

/// Shape of the legacy JSON settings file. Absent keys keep current values.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacySettings {
  default_config_path: Option<String>,
  build_in_editor_arguments: Option<Vec<String>>,
  uses_non_exempt_encryption: Option<bool>,
  add_gradle_wrapper: Option<bool>,
}

impl LegacySettings {
  fn overlay(self, settings: &mut ToolSettings) {
    if let Some(dir) = self.default_config_path {
      settings.default_config_dir = dir;
    }
    if let Some(args) = self.build_in_editor_arguments {
      settings.local_build_arguments = args;
    }
    if let Some(value) = self.uses_non_exempt_encryption {
      settings.uses_non_exempt_encryption = value;
    }
    if let Some(value) = self.add_gradle_wrapper {
      settings.add_gradle_wrapper = value;
    }
  }
}

impl ToolSettings {
  /// Load the project's settings, importing the legacy file if present.
  ///
  /// A missing settings file yields defaults.
  pub fn load(paths: &ProjectPaths) -> Result<Self, SettingsError> {
    let path = paths.settings_file();
    let mut settings = match fs::read_to_string(&path) {
      Ok(content) => toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.clone(),
        source,
      })?,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "no settings file, using defaults");
        Self::default()
      }
      Err(source) => return Err(SettingsError::Read { path, source }),
    };

    settings.import_legacy(paths)?;
    Ok(settings)
  }

  /// Import the legacy JSON settings file once. Returns whether one was found.
  fn import_legacy(&mut self, paths: &ProjectPaths) -> Result<bool, SettingsError> {
    let legacy_path = paths.legacy_settings_file();
    let content = match fs::read_to_string(&legacy_path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
      Err(source) => {
        return Err(SettingsError::Read {
          path: legacy_path,
          source,
        });
      }
    };

    let legacy: LegacySettings = serde_json::from_str(&content).map_err(|source| SettingsError::ParseLegacy {
      path: legacy_path.clone(),
      source,
    })?;
    legacy.overlay(self);
    self.save(paths)?;
    remove_if_exists(&legacy_path).map_err(|source| SettingsError::Write {
      path: legacy_path.clone(),
      source,
    })?;

    info!(path = %legacy_path.display(), "imported legacy settings");
    Ok(true)
  }

  pub fn save(&self, paths: &ProjectPaths) -> Result<(), SettingsError> {
    let path = paths.settings_file();
    let content = toml::to_string_pretty(self)?;
    write_atomic(&path, content).map_err(|source| SettingsError::Write { path, source })
  }

  /// `local_build_arguments` paired up into an argument map.
  ///
  /// A trailing key without a value maps to an empty string.
  pub fn local_build_args(&self) -> BuildArgs {
    self
      .local_build_arguments
      .chunks(2)
      .map(|pair| (pair[0].clone(), pair.get(1).cloned().unwrap_or_default()))
      .collect()
  }

  /// Export flags a fresh environment starts with.
  pub fn current_build_settings(&self) -> CurrentBuildSettings {
    CurrentBuildSettings {
      uses_non_exempt_encryption: self.uses_non_exempt_encryption,
      add_gradle_wrapper: self.add_gradle_wrapper,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn missing_file_gives_defaults() {
    let temp = TempDir::new().unwrap();
    let settings = ToolSettings::load(&ProjectPaths::new(temp.path())).unwrap();

    assert_eq!(settings, ToolSettings::default());
    assert_eq!(settings.default_config_dir, "BuildConfigs");
    assert_eq!(settings.builder.timeout_minutes, 60);
    assert!(!ProjectPaths::new(temp.path()).settings_file().exists());
  }

  #[test]
  fn partial_toml_keeps_other_defaults() {
    let temp = TempDir::new().unwrap();
    let paths = ProjectPaths::new(temp.path());
    fs::create_dir_all(paths.project_settings_dir()).unwrap();
    fs::write(
      paths.settings_file(),
      "default_config_dir = \"Configs\"\n\n[builder]\nprogram = \"unity\"\n",
    )
    .unwrap();

    let settings = ToolSettings::load(&paths).unwrap();

    assert_eq!(settings.default_config_dir, "Configs");
    assert_eq!(settings.builder.program.as_deref(), Some("unity"));
    assert_eq!(settings.builder.report_grace_seconds, 5);
    assert_eq!(settings.local_build_arguments, vec!["-buildNumber", "0001"]);
  }

  #[test]
  fn legacy_file_is_imported_once() {
    let temp = TempDir::new().unwrap();
    let paths = ProjectPaths::new(temp.path());
    fs::create_dir_all(paths.project_settings_dir()).unwrap();
    fs::write(
      paths.legacy_settings_file(),
      r#"{"DefaultConfigPath":"Assets/Configs","BuildInEditorArguments":["-buildNumber","0042"],"EnableBuildWindowIntegration":true}"#,
    )
    .unwrap();

    let settings = ToolSettings::load(&paths).unwrap();

    assert_eq!(settings.default_config_dir, "Assets/Configs");
    assert_eq!(settings.local_build_arguments, vec!["-buildNumber", "0042"]);
    assert!(!settings.add_gradle_wrapper);
    assert!(!paths.legacy_settings_file().exists());
    assert!(paths.settings_file().exists());

    // The imported values now come from the TOML file.
    assert_eq!(ToolSettings::load(&paths).unwrap(), settings);
  }

  #[test]
  fn local_build_args_pairs_keys_and_values() {
    let settings = ToolSettings {
      local_build_arguments: vec![
        "-buildNumber".to_string(),
        "0007".to_string(),
        "-outputDir".to_string(),
      ],
      ..Default::default()
    };

    let args = settings.local_build_args();

    assert_eq!(args.get("-buildNumber").map(String::as_str), Some("0007"));
    assert_eq!(args.get("-outputDir").map(String::as_str), Some(""));
  }

  #[test]
  fn seeds_current_build_settings() {
    let settings = ToolSettings {
      uses_non_exempt_encryption: true,
      ..Default::default()
    };
    let current = settings.current_build_settings();
    assert!(current.uses_non_exempt_encryption);
    assert!(!current.add_gradle_wrapper);
  }
}
