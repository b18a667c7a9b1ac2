//! Build command integration tests.

use predicates::prelude::*;

use super::common::{REPORT_SUCCESS, TestProject, sh_builder};

#[test]
fn build_succeeds_and_restores_environment() {
  let project = TestProject::with_configs(&["ios.toml"]);
  project.switch("ios");

  project
    .bt_cmd()
    .args(["build", "ios", "--build-number", "0042"])
    .args(sh_builder(REPORT_SUCCESS))
    .assert()
    .success()
    .stdout(predicate::str::contains("Build ios succeeded"))
    .stdout(predicate::str::contains("packaged"));

  let info = project.read_json("Assets/Resources/BuildInfo.json");
  assert_eq!(info["build_number"], "0042");
  assert_eq!(info["application_identifier"], "com.example.ci");

  let env = project.read_json("ProjectSettings/BuildEnvironment.json");
  assert_eq!(env["active_target"], "ios");
  assert_eq!(env["player"]["ios_build_number"], "0");
  assert!(env["player"]["application_identifiers"].get("ios").is_none());
}

#[test]
fn builder_receives_options_file() {
  let project = TestProject::with_configs(&["ios.toml"]);
  project.switch("ios");
  let script = format!(
    r#"grep -q '"com.example.ci"' Assets/Resources/BuildInfo.json || exit 7
grep -q '"/ci/out/ios"' "$BUILDTOOL_OPTIONS" || exit 8
{REPORT_SUCCESS}"#
  );

  project
    .bt_cmd()
    .args(["build", "ios", "--output-dir", "/ci/out"])
    .args(sh_builder(&script))
    .assert()
    .success();
}

#[test]
fn failed_build_exits_nonzero_and_restores() {
  let project = TestProject::with_configs(&["ios.toml"]);
  project.switch("ios");

  project
    .bt_cmd()
    .args(["build", "ios"])
    .args(sh_builder("exit 3"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("build failed"));

  let env = project.read_json("ProjectSettings/BuildEnvironment.json");
  assert!(env["player"]["application_identifiers"].get("ios").is_none());
}

#[test]
fn apply_failure_skips_builder() {
  let project = TestProject::with_configs(&["missing_icon.toml"]);
  project.switch("ios");

  project
    .bt_cmd()
    .args(["build", "missing_icon"])
    .args(sh_builder("touch builder-ran"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to apply"));

  assert!(!project.path("builder-ran").exists());
  let env = project.read_json("ProjectSettings/BuildEnvironment.json");
  assert!(env["player"]["application_identifiers"].get("ios").is_none());
}

#[test]
fn target_mismatch_fails() {
  let project = TestProject::with_configs(&["ios.toml"]);
  project.switch("android");

  project
    .bt_cmd()
    .args(["build", "ios"])
    .args(sh_builder(REPORT_SUCCESS))
    .assert()
    .failure()
    .stderr(predicate::str::contains("active build target is android"));
}

#[test]
fn invalid_build_number_fails() {
  let project = TestProject::with_configs(&["ios.toml"]);
  project.switch("ios");

  project
    .bt_cmd()
    .args(["build", "ios", "--build-number", "abc"])
    .args(sh_builder(REPORT_SUCCESS))
    .assert()
    .failure()
    .stderr(predicate::str::contains("-buildNumber"));

  assert!(!project.path("Assets/Resources/BuildInfo.json").exists());
}

#[test]
fn build_without_arguments_uses_local_arguments() {
  let project = TestProject::with_configs(&["ios.toml"]);
  project.switch("ios");

  project
    .bt_cmd()
    .args(["build", "ios"])
    .args(sh_builder(REPORT_SUCCESS))
    .assert()
    .success();

  assert_eq!(
    project.read_json("Assets/Resources/BuildInfo.json")["build_number"],
    "0001"
  );
}

#[test]
fn explicit_arguments_replace_local_arguments() {
  let project = TestProject::with_configs(&["ios.toml"]);
  project.switch("ios");
  project.write_file(
    "ProjectSettings/BuildToolSettings.toml",
    "local_build_arguments = [\"-buildNumber\", \"0001\", \"-outputDir\", \"/local/out\"]\n",
  );
  let script = format!(
    r#"grep -q '/local/out' "$BUILDTOOL_OPTIONS" && exit 9
{REPORT_SUCCESS}"#
  );

  project
    .bt_cmd()
    .args(["build", "ios", "--build-number", "0007"])
    .args(sh_builder(&script))
    .assert()
    .success();

  assert_eq!(
    project.read_json("Assets/Resources/BuildInfo.json")["build_number"],
    "0007"
  );
}

#[test]
fn build_error_is_reported_when_environment_cannot_be_saved() {
  let project = TestProject::with_configs(&["ios.toml"]);
  project.switch("ios");
  std::fs::create_dir_all(project.path("ProjectSettings/BuildEnvironment.json.tmp")).unwrap();

  project
    .bt_cmd()
    .args(["build", "ios"])
    .args(sh_builder("exit 3"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("build failed"))
    .stderr(predicate::str::contains("Failed to save build environment"));
}

#[test]
fn builder_from_settings_is_used() {
  let project = TestProject::with_configs(&["ios.toml"]);
  project.switch("ios");
  project.write_file(
    "ProjectSettings/BuildToolSettings.toml",
    &format!(
      "[builder]\nprogram = \"/bin/sh\"\nargs = [\"-c\", {:?}]\n",
      REPORT_SUCCESS
    ),
  );

  project
    .bt_cmd()
    .args(["build", "ios", "--output", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"result\": \"succeeded\""));
}

#[test]
fn missing_builder_fails() {
  let project = TestProject::with_configs(&["ios.toml"]);
  project.switch("ios");

  project
    .bt_cmd()
    .args(["build", "ios"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("No builder configured"));
}

#[test]
fn build_migrates_legacy_configuration() {
  let project = TestProject::with_configs(&["legacy.toml"]);
  project.switch("android");

  project
    .bt_cmd()
    .args(["build", "legacy"])
    .args(sh_builder(REPORT_SUCCESS))
    .assert()
    .success();

  let migrated = project.read_file("BuildConfigs/legacy.toml");
  assert!(!migrated.contains("legacy_modifiers"));
  assert!(migrated.contains("com.example.legacy"));
}
