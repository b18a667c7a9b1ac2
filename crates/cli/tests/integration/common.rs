//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated project directory.
pub struct TestProject {
  pub temp: TempDir,
}

impl TestProject {
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Project with the given fixtures copied into `BuildConfigs/`.
  pub fn with_configs(fixtures: &[&str]) -> Self {
    let project = Self::empty();
    for name in fixtures {
      project.write_file(&format!("BuildConfigs/{}", name), &fixture_content(name));
    }
    project
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.temp.path().join(relative)
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.path(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path)).unwrap()
  }

  pub fn read_json(&self, relative_path: &str) -> serde_json::Value {
    serde_json::from_str(&self.read_file(relative_path)).unwrap()
  }

  /// `bt` command rooted at this project, without a storage passphrase.
  pub fn bt_cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("bt");
    cmd
      .env("BUILDTOOL_PROJECT", self.temp.path())
      .env_remove("BUILDTOOL_STORAGE_PASSPHRASE")
      .env_remove("RUST_LOG");
    cmd
  }

  /// Switch the project's active target.
  pub fn switch(&self, target: &str) {
    self.bt_cmd().arg("switch").arg(target).assert().success();
  }
}

/// Builder arguments running `script` through `/bin/sh`.
#[cfg(unix)]
pub fn sh_builder(script: &str) -> Vec<String> {
  vec![
    "--builder".to_string(),
    "/bin/sh".to_string(),
    "--builder-arg".to_string(),
    "-c".to_string(),
    "--builder-arg".to_string(),
    script.to_string(),
  ]
}

/// Script writing a successful report.
pub const REPORT_SUCCESS: &str = r#"printf '{"result":"succeeded","summary":"packaged"}' > "$BUILDTOOL_REPORT""#;
