//! Build processors.
//!
//! A processor is a reversible mutation of the build environment. For each
//! build, every configured [`ProcessorTemplate`] is instantiated into a fresh
//! [`BuildProcessor`] owned by the transaction.
//!
//! # Lifecycle
//!
//! - `apply()` - mutate the environment, capturing what is needed to undo
//! - `contribute_to_options()` - fold into the builder options, right after a successful apply
//! - `preprocess_build()` - optional hook run once before the external build; not undone
//! - `restore()` - revert the mutation, in reverse apply order
//!
//! # Submodules
//!
//! - [`builtin`] - processors shipped with buildtool and their serialized form
//! - [`pool`] - transaction-owned processor instances

pub mod builtin;
pub mod pool;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::environment::BuildEnvironment;
use crate::options::BuildOptions;
use crate::storage::{EncryptedItem, EncryptedStorage, StorageError};
use crate::target::BuildTarget;

pub use builtin::ProcessorConfig;
pub use pool::ProcessorPool;

/// Errors raised by a processor step.
#[derive(Debug, Error)]
pub enum ProcessorError {
  /// The processor does not support the target being built.
  #[error("{kind} does not support target {target}")]
  UnsupportedTarget { kind: &'static str, target: BuildTarget },

  /// A precondition of the processor is not met.
  #[error("{0}")]
  Precondition(String),

  /// A file the processor depends on does not exist.
  #[error("file not found: {0}")]
  MissingFile(PathBuf),

  /// A secret could not be read from encrypted storage.
  #[error("secret {key} unavailable: {source}")]
  Secret {
    key: String,
    #[source]
    source: StorageError,
  },

  /// `restore()` was called on a processor that never applied.
  #[error("restore called before a successful apply")]
  NotApplied,

  #[error("io error: {0}")]
  Io(#[from] io::Error),

  #[error("serialization error: {0}")]
  Serialize(#[from] serde_json::Error),
}

/// Everything a processor step may touch.
pub struct ProcessorContext<'a> {
  /// Target of the configuration being built.
  pub target: BuildTarget,
  /// Name of the configuration being built.
  pub config_name: &'a str,
  pub env: &'a mut BuildEnvironment,
  pub storage: Option<&'a dyn EncryptedStorage<EncryptedItem>>,
}

impl ProcessorContext<'_> {
  /// Read a secret from encrypted storage.
  pub fn secret(&self, key: &str) -> Result<String, ProcessorError> {
    let storage = self
      .storage
      .ok_or_else(|| ProcessorError::Precondition(format!("secret {key} requested but no encrypted storage is open")))?;
    storage
      .get(key)
      .map(|item| item.secret)
      .map_err(|source| ProcessorError::Secret {
        key: key.to_string(),
        source,
      })
  }
}

/// A reversible unit of build-environment mutation.
///
/// Implementations capture their undo state in `apply` and must leave no
/// partial, unrecorded change when `apply` fails.
pub trait BuildProcessor: Send {
  /// Display name used in logs and error reports.
  fn name(&self) -> &str;

  fn kind(&self) -> &'static str;

  fn apply(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError>;

  fn restore(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError>;

  fn contribute_to_options(&self, options: BuildOptions) -> BuildOptions {
    options
  }

  fn preprocess_build(&mut self, _ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    Ok(())
  }
}

/// Durable definition a processor instance is created from.
pub trait ProcessorTemplate {
  fn instantiate(&self) -> Box<dyn BuildProcessor>;
}
