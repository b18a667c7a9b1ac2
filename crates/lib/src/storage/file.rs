//! File-backed encrypted storage.
//!
//! # Storage Layout
//!
//! ```text
//! ProjectSettings/BuildToolSettings/Storage/
//! ├── salt                 # Argon2id salt, created on first open
//! └── <sha256(key)>.bin    # nonce || AES-256-GCM(json(value))
//! ```
//!
//! Keys are hashed so arbitrary key strings map to safe file names.

use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::cipher::SALT_SIZE;
use super::{EncryptedStorage, StorageCipher, StorageError};
use crate::util::fs::{remove_if_exists, write_atomic};

const ITEM_EXTENSION: &str = "bin";
const SALT_FILE: &str = "salt";

pub struct FileEncryptedStorage<T> {
  root: PathBuf,
  cipher: StorageCipher,
  _value: PhantomData<fn() -> T>,
}

impl<T> FileEncryptedStorage<T> {
  pub fn new(root: impl Into<PathBuf>, cipher: StorageCipher) -> Self {
    Self {
      root: root.into(),
      cipher,
      _value: PhantomData,
    }
  }

  /// Open storage under `root` with a passphrase-derived key.
  ///
  /// The salt is read from `root`, or generated and written there the
  /// first time.
  pub fn open(root: impl Into<PathBuf>, passphrase: &str) -> Result<Self, StorageError> {
    let root = root.into();
    let salt = load_or_create_salt(&root)?;
    let cipher = StorageCipher::from_passphrase(passphrase, &salt)?;
    Ok(Self::new(root, cipher))
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn item_path(&self, key: &str) -> PathBuf {
    let digest = Sha256::digest(key.as_bytes());
    self.root.join(format!("{}.{}", hex::encode(digest), ITEM_EXTENSION))
  }
}

fn load_or_create_salt(root: &Path) -> Result<[u8; SALT_SIZE], StorageError> {
  let path = root.join(SALT_FILE);
  match fs::read(&path) {
    Ok(bytes) => <[u8; SALT_SIZE]>::try_from(bytes.as_slice()).map_err(|_| StorageError::InvalidSalt(path)),
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      let salt = StorageCipher::generate_salt();
      write_atomic(&path, salt).map_err(|source| StorageError::Write {
        path: path.clone(),
        source,
      })?;
      debug!(path = %path.display(), "storage salt created");
      Ok(salt)
    }
    Err(source) => Err(StorageError::Read { path, source }),
  }
}

impl<T> EncryptedStorage<T> for FileEncryptedStorage<T>
where
  T: Serialize + DeserializeOwned,
{
  fn get(&self, key: &str) -> Result<T, StorageError> {
    let path = self.item_path(key);
    let data = match fs::read(&path) {
      Ok(data) => data,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StorageError::NotFound(key.to_string())),
      Err(source) => return Err(StorageError::Read { path, source }),
    };

    let plaintext = self.cipher.decrypt(&data)?;
    let value = serde_json::from_slice(&plaintext).map_err(StorageError::Decode)?;
    debug!(key = %key, "secret read");
    Ok(value)
  }

  fn set(&self, key: &str, value: &T) -> Result<(), StorageError> {
    let path = self.item_path(key);
    let plaintext = serde_json::to_vec(value).map_err(StorageError::Encode)?;
    let encrypted = self.cipher.encrypt(&plaintext)?;
    write_atomic(&path, encrypted).map_err(|source| StorageError::Write {
      path: path.clone(),
      source,
    })?;
    info!(key = %key, path = %path.display(), "secret stored");
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<bool, StorageError> {
    let path = self.item_path(key);
    let removed = remove_if_exists(&path).map_err(|source| StorageError::Write { path, source })?;
    info!(key = %key, removed, "secret removed");
    Ok(removed)
  }
}
