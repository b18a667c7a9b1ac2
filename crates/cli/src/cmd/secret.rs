//! Secrets in the project's encrypted storage.
//!
//! The storage key is derived from `BUILDTOOL_STORAGE_PASSPHRASE`.

use anyhow::{Context, Result, anyhow};

use buildtool_lib::consts::STORAGE_PASSPHRASE_ENV_VAR;
use buildtool_lib::project::ProjectPaths;
use buildtool_lib::storage::{EncryptedItem, EncryptedStorage};

use super::open_storage;
use crate::SecretAction;
use crate::output::{print_info, print_success};

pub fn cmd_secret(project: &ProjectPaths, action: SecretAction) -> Result<()> {
  let storage = open_storage(project)?.ok_or_else(|| anyhow!("{} is not set", STORAGE_PASSPHRASE_ENV_VAR))?;

  match action {
    SecretAction::Set { key, value } => {
      storage
        .set(&key, &EncryptedItem::new(value))
        .with_context(|| format!("Failed to store secret {}", key))?;
      print_success(&format!("Stored secret {}", key));
    }
    SecretAction::Get { key } => {
      let item = storage.get(&key).with_context(|| format!("Failed to read secret {}", key))?;
      println!("{}", item.secret);
    }
    SecretAction::Remove { key } => {
      if storage.remove(&key).with_context(|| format!("Failed to remove secret {}", key))? {
        print_success(&format!("Removed secret {}", key));
      } else {
        print_info(&format!("No secret named {}", key));
      }
    }
  }
  Ok(())
}
