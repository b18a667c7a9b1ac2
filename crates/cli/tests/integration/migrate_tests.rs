//! Migrate command integration tests.

use predicates::prelude::*;

use super::common::TestProject;

#[test]
fn migrate_rewrites_legacy_configurations() {
  let project = TestProject::with_configs(&["legacy.toml", "ios.toml"]);
  let untouched = project.read_file("BuildConfigs/ios.toml");

  project
    .bt_cmd()
    .arg("migrate")
    .assert()
    .success()
    .stdout(predicate::str::contains("Migrated legacy"));

  let migrated = project.read_file("BuildConfigs/legacy.toml");
  assert!(!migrated.contains("legacy_modifiers"));
  assert!(migrated.contains("kind = \"scripting_defines\""));
  assert_eq!(project.read_file("BuildConfigs/ios.toml"), untouched);
}

#[test]
fn second_migrate_finds_nothing() {
  let project = TestProject::with_configs(&["legacy.toml"]);

  project.bt_cmd().args(["migrate", "legacy"]).assert().success();
  let after_first = project.read_file("BuildConfigs/legacy.toml");

  project
    .bt_cmd()
    .args(["migrate", "legacy"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to migrate"));
  assert_eq!(project.read_file("BuildConfigs/legacy.toml"), after_first);
}

#[test]
fn migrate_missing_configuration_fails() {
  let project = TestProject::empty();

  project
    .bt_cmd()
    .args(["migrate", "nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("configuration not found"));
}

#[test]
fn legacy_settings_are_imported() {
  let project = TestProject::empty();
  project.write_file(
    "ProjectSettings/BuildToolSettings.json",
    r#"{"DefaultConfigPath":"Configs","BuildInEditorArguments":["-buildNumber","0005"]}"#,
  );
  project.write_file("Configs/ios.toml", "target = \"ios\"\n");

  project
    .bt_cmd()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("ios"));

  assert!(!project.path("ProjectSettings/BuildToolSettings.json").exists());
  let settings = project.read_file("ProjectSettings/BuildToolSettings.toml");
  assert!(settings.contains("Configs"));
  assert!(settings.contains("0005"));
}
