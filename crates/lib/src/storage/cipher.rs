//! AES-256-GCM encryption for stored values.
//!
//! Encrypted format: `nonce (12 bytes) || ciphertext`. Every call uses a
//! fresh random nonce, so the same value never encrypts to the same bytes.
//!
//! Passphrase keys are derived with Argon2id over a per-project salt kept
//! next to the stored values.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use super::StorageError;

const NONCE_SIZE: usize = 12;

/// Length of a project's key derivation salt.
pub const SALT_SIZE: usize = 16;

pub struct StorageCipher {
  cipher: Aes256Gcm,
}

impl StorageCipher {
  pub fn new(key: &[u8; 32]) -> Self {
    Self {
      cipher: Aes256Gcm::new(key.into()),
    }
  }

  /// A fresh random salt for [`StorageCipher::from_passphrase`].
  pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
  }

  /// Derive the key from a passphrase and the project's salt with Argon2id.
  pub fn from_passphrase(passphrase: &str, salt: &[u8]) -> Result<Self, StorageError> {
    use argon2::{Algorithm, Argon2, Params, Version};

    let params = Params::new(19456, 2, 1, Some(32)).map_err(|_| StorageError::KeyDerivation)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; 32];
    argon2
      .hash_password_into(passphrase.as_bytes(), salt, &mut key)
      .map_err(|_| StorageError::KeyDerivation)?;

    Ok(Self::new(&key))
  }

  pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, StorageError> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = self
      .cipher
      .encrypt(&nonce, plaintext)
      .map_err(|_| StorageError::Encrypt)?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce);
    result.extend_from_slice(&ciphertext);
    Ok(result)
  }

  pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
    if data.len() < NONCE_SIZE {
      return Err(StorageError::Truncated);
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    self
      .cipher
      .decrypt(nonce, ciphertext)
      .map_err(|_| StorageError::Decrypt)
  }
}
