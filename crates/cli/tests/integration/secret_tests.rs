//! Secret command integration tests.

use predicates::prelude::*;

use super::common::TestProject;

const PASSPHRASE: &str = "correct horse battery staple";

#[test]
fn set_get_remove_round_trip() {
  let project = TestProject::empty();

  project
    .bt_cmd()
    .env("BUILDTOOL_STORAGE_PASSPHRASE", PASSPHRASE)
    .args(["secret", "set", "android.keystore", "hunter2"])
    .assert()
    .success();

  project
    .bt_cmd()
    .env("BUILDTOOL_STORAGE_PASSPHRASE", PASSPHRASE)
    .args(["secret", "get", "android.keystore"])
    .assert()
    .success()
    .stdout(predicate::str::diff("hunter2\n"));

  project
    .bt_cmd()
    .env("BUILDTOOL_STORAGE_PASSPHRASE", PASSPHRASE)
    .args(["secret", "remove", "android.keystore"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed"));

  project
    .bt_cmd()
    .env("BUILDTOOL_STORAGE_PASSPHRASE", PASSPHRASE)
    .args(["secret", "get", "android.keystore"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no value stored"));
}

#[test]
fn wrong_passphrase_cannot_read() {
  let project = TestProject::empty();

  project
    .bt_cmd()
    .env("BUILDTOOL_STORAGE_PASSPHRASE", PASSPHRASE)
    .args(["secret", "set", "token", "value"])
    .assert()
    .success();

  project
    .bt_cmd()
    .env("BUILDTOOL_STORAGE_PASSPHRASE", "something else")
    .args(["secret", "get", "token"])
    .assert()
    .failure();
}

#[test]
fn secret_requires_passphrase() {
  let project = TestProject::empty();

  project
    .bt_cmd()
    .args(["secret", "get", "token"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("BUILDTOOL_STORAGE_PASSPHRASE"));
}
