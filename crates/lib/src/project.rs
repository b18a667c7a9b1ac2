//! Project-relative file layout.
//!
//! Every file buildtool reads or writes lives under the project root:
//!
//! ```text
//! <project>/
//! ├── ProjectSettings/
//! │   ├── BuildToolSettings.toml      # ToolSettings
//! │   ├── BuildToolSettings.json      # legacy settings, imported once then deleted
//! │   ├── BuildEnvironment.json       # ambient build environment
//! │   └── BuildToolSettings/Storage/  # encrypted secrets
//! └── BuildConfigs/<name>.toml        # build configurations
//! ```

use std::path::{Path, PathBuf};

use crate::consts::{
  ENVIRONMENT_FILENAME, LEGACY_SETTINGS_FILENAME, PROJECT_ENV_VAR, PROJECT_SETTINGS_DIR, SETTINGS_FILENAME, STORAGE_DIR,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
  root: PathBuf,
}

impl ProjectPaths {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Project rooted at `BUILDTOOL_PROJECT`, or the current directory.
  pub fn current() -> Self {
    if let Ok(path) = std::env::var(PROJECT_ENV_VAR) {
      return Self::new(path);
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Self::new(cwd)
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn project_settings_dir(&self) -> PathBuf {
    self.root.join(PROJECT_SETTINGS_DIR)
  }

  pub fn settings_file(&self) -> PathBuf {
    self.project_settings_dir().join(SETTINGS_FILENAME)
  }

  pub fn legacy_settings_file(&self) -> PathBuf {
    self.project_settings_dir().join(LEGACY_SETTINGS_FILENAME)
  }

  pub fn environment_file(&self) -> PathBuf {
    self.project_settings_dir().join(ENVIRONMENT_FILENAME)
  }

  pub fn storage_dir(&self) -> PathBuf {
    self.project_settings_dir().join(STORAGE_DIR)
  }

  /// Directory holding build configurations, relative to the project root.
  pub fn config_dir(&self, relative: &str) -> PathBuf {
    self.root.join(relative)
  }

  /// Resolve a project-relative path. Absolute paths are returned unchanged.
  pub fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use temp_env::with_var;

  #[test]
  #[serial]
  fn env_var_overrides_current_directory() {
    with_var(PROJECT_ENV_VAR, Some("/custom/project"), || {
      let paths = ProjectPaths::current();
      assert_eq!(paths.root(), Path::new("/custom/project"));
      assert_eq!(
        paths.settings_file(),
        PathBuf::from("/custom/project/ProjectSettings/BuildToolSettings.toml")
      );
    });
  }

  #[test]
  #[serial]
  fn falls_back_to_current_directory() {
    with_var(PROJECT_ENV_VAR, None::<&str>, || {
      let paths = ProjectPaths::current();
      assert_eq!(paths.root(), std::env::current_dir().unwrap());
    });
  }

  #[test]
  fn storage_lives_under_project_settings() {
    let paths = ProjectPaths::new("/p");
    assert_eq!(
      paths.storage_dir(),
      PathBuf::from("/p/ProjectSettings/BuildToolSettings/Storage")
    );
  }

  #[test]
  fn resolve_keeps_absolute_paths() {
    let paths = ProjectPaths::new("/p");
    assert_eq!(paths.resolve(Path::new("/abs/icon.png")), PathBuf::from("/abs/icon.png"));
    assert_eq!(paths.resolve(Path::new("icons/a.png")), PathBuf::from("/p/icons/a.png"));
  }
}
