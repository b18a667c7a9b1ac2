mod build;
mod info;
mod list;
mod migrate;
mod secret;
mod switch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use buildtool_lib::consts::STORAGE_PASSPHRASE_ENV_VAR;
use buildtool_lib::project::ProjectPaths;
use buildtool_lib::settings::ToolSettings;
use buildtool_lib::storage::{EncryptedItem, FileEncryptedStorage};

pub use build::{BuildCommand, cmd_build};
pub use info::cmd_info;
pub use list::cmd_list;
pub use migrate::cmd_migrate;
pub use secret::cmd_secret;
pub use switch::cmd_switch;

/// Resolve a configuration argument to a file.
///
/// Anything that looks like a path is used as-is; a bare name maps to
/// `<config dir>/<name>.toml`.
fn config_path(project: &ProjectPaths, settings: &ToolSettings, config: &str) -> PathBuf {
  let as_path = Path::new(config);
  if as_path.extension().is_some_and(|ext| ext == "toml") || as_path.components().count() > 1 {
    return project.resolve(as_path);
  }
  project
    .config_dir(&settings.default_config_dir)
    .join(format!("{config}.toml"))
}

/// Encrypted storage keyed by `BUILDTOOL_STORAGE_PASSPHRASE`, if set.
fn open_storage(project: &ProjectPaths) -> Result<Option<FileEncryptedStorage<EncryptedItem>>> {
  let Ok(passphrase) = std::env::var(STORAGE_PASSPHRASE_ENV_VAR) else {
    return Ok(None);
  };
  let storage = FileEncryptedStorage::open(project.storage_dir(), &passphrase).context("Failed to open secret storage")?;
  Ok(Some(storage))
}
