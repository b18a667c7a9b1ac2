//! Android keystore signing.
//!
//! Keystore and alias passwords are never part of a configuration: the
//! configuration names keys in encrypted storage and the passwords are read
//! at apply time.

use std::path::PathBuf;

use tracing::info;

use crate::environment::AndroidKeystore;
use crate::processor::{BuildProcessor, ProcessorContext, ProcessorError};
use crate::target::BuildTarget;

pub struct AndroidSigning {
  name: String,
  keystore: PathBuf,
  alias: String,
  keystore_secret: String,
  alias_secret: String,
  previous: Option<AndroidKeystore>,
}

impl AndroidSigning {
  pub fn new(
    keystore: impl Into<PathBuf>,
    alias: impl Into<String>,
    keystore_secret: impl Into<String>,
    alias_secret: impl Into<String>,
  ) -> Self {
    let alias = alias.into();
    Self {
      name: format!("android_signing({alias})"),
      keystore: keystore.into(),
      alias,
      keystore_secret: keystore_secret.into(),
      alias_secret: alias_secret.into(),
      previous: None,
    }
  }
}

impl BuildProcessor for AndroidSigning {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> &'static str {
    "android_signing"
  }

  fn apply(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    if ctx.target != BuildTarget::Android {
      return Err(ProcessorError::UnsupportedTarget {
        kind: self.kind(),
        target: ctx.target,
      });
    }

    let resolved = ctx.env.project().resolve(&self.keystore);
    if !resolved.is_file() {
      return Err(ProcessorError::MissingFile(resolved));
    }

    // Read both secrets before touching the environment.
    let password = ctx.secret(&self.keystore_secret)?;
    let alias_password = ctx.secret(&self.alias_secret)?;

    self.previous = Some(ctx.env.player.android_keystore.clone());
    ctx.env.player.android_keystore = AndroidKeystore {
      path: Some(self.keystore.clone()),
      alias: Some(self.alias.clone()),
      password: Some(password),
      alias_password: Some(alias_password),
    };
    info!(keystore = %self.keystore.display(), alias = %self.alias, "android keystore configured");
    Ok(())
  }

  fn restore(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    ctx.env.player.android_keystore = self.previous.take().ok_or(ProcessorError::NotApplied)?;
    Ok(())
  }
}
