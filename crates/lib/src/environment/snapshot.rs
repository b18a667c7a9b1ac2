//! Snapshot and scoped restore of ambient build settings.
//!
//! An [`EnvironmentSnapshot`] is an immutable copy of everything a build is
//! allowed to change behind the caller's back. [`EnvironmentScope`] takes one
//! on entry and writes it back on exit, whether the scope is finished
//! explicitly or dropped on an early return or panic.
//!
//! Scopes nest: an inner scope borrows the outer one mutably through
//! `DerefMut`, so each nesting depth holds exactly one live snapshot.

use std::ops::{Deref, DerefMut};

use tracing::debug;

use super::{BuildEnvironment, CurrentBuildSettings, PlayerSettings};

/// Captured ambient settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
  player: PlayerSettings,
  current: CurrentBuildSettings,
}

impl EnvironmentSnapshot {
  /// Read the current ambient settings.
  pub fn capture(env: &BuildEnvironment) -> Self {
    Self {
      player: env.player.clone(),
      current: env.current.clone(),
    }
  }

  /// Write every captured field back, overwriting any change made since.
  pub fn restore(&self, env: &mut BuildEnvironment) {
    env.player = self.player.clone();
    env.current = self.current.clone();
  }

  /// Whether `env` still matches the captured values.
  pub fn matches(&self, env: &BuildEnvironment) -> bool {
    self.player == env.player && self.current == env.current
  }
}

/// Guard restoring a snapshot when the scope ends.
pub struct EnvironmentScope<'a> {
  env: &'a mut BuildEnvironment,
  snapshot: Option<EnvironmentSnapshot>,
}

impl<'a> EnvironmentScope<'a> {
  /// Capture the environment and start the scope.
  pub fn enter(env: &'a mut BuildEnvironment) -> Self {
    let snapshot = EnvironmentSnapshot::capture(env);
    debug!(build_number = %snapshot.player.ios_build_number, "environment snapshot captured");
    Self {
      env,
      snapshot: Some(snapshot),
    }
  }

  /// Restore the snapshot and end the scope.
  pub fn finish(mut self) {
    self.restore_once();
  }

  fn restore_once(&mut self) {
    if let Some(snapshot) = self.snapshot.take() {
      snapshot.restore(self.env);
      debug!("environment snapshot restored");
    }
  }
}

impl Deref for EnvironmentScope<'_> {
  type Target = BuildEnvironment;

  fn deref(&self) -> &BuildEnvironment {
    &*self.env
  }
}

impl DerefMut for EnvironmentScope<'_> {
  fn deref_mut(&mut self) -> &mut BuildEnvironment {
    &mut *self.env
  }
}

impl Drop for EnvironmentScope<'_> {
  fn drop(&mut self) {
    self.restore_once();
  }
}
