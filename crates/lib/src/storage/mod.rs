//! Encrypted secret storage.
//!
//! Processors that need credentials (keystore passwords, API tokens) read
//! them through [`EncryptedStorage`]. Secrets are stored encrypted at rest
//! under `ProjectSettings/BuildToolSettings/Storage`.
//!
//! # Submodules
//!
//! - [`cipher`] - AES-256-GCM encryption of stored values
//! - [`file`] - one encrypted file per key

pub mod cipher;
pub mod file;

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cipher::StorageCipher;
pub use file::FileEncryptedStorage;

/// Errors from encrypted storage.
///
/// Never carries plaintext or key material.
#[derive(Debug, Error)]
pub enum StorageError {
  #[error("no value stored for key {0}")]
  NotFound(String),

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("encryption failed")]
  Encrypt,

  /// Wrong key or tampered data.
  #[error("decryption failed")]
  Decrypt,

  #[error("stored value too short to contain a nonce")]
  Truncated,

  #[error("key derivation failed")]
  KeyDerivation,

  #[error("invalid key derivation salt in {0}")]
  InvalidSalt(PathBuf),

  #[error("failed to encode stored value: {0}")]
  Encode(#[source] serde_json::Error),

  #[error("failed to decode stored value: {0}")]
  Decode(#[source] serde_json::Error),
}

/// Keyed store of values encrypted at rest.
pub trait EncryptedStorage<T> {
  fn get(&self, key: &str) -> Result<T, StorageError>;

  fn set(&self, key: &str, value: &T) -> Result<(), StorageError>;

  /// Remove a value. Returns whether anything was stored under `key`.
  fn remove(&self, key: &str) -> Result<bool, StorageError>;

  fn contains(&self, key: &str) -> Result<bool, StorageError> {
    match self.get(key) {
      Ok(_) => Ok(true),
      Err(StorageError::NotFound(_)) => Ok(false),
      Err(e) => Err(e),
    }
  }
}

/// The value type processors store credentials as.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedItem {
  pub secret: String,
}

impl EncryptedItem {
  pub fn new(secret: impl Into<String>) -> Self {
    Self { secret: secret.into() }
  }
}

impl fmt::Debug for EncryptedItem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EncryptedItem").field("secret", &"<redacted>").finish()
  }
}
