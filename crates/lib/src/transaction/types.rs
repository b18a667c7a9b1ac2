//! Types for build transactions.

use std::collections::BTreeMap;
use std::fmt;
use std::num::ParseIntError;

use thiserror::Error;

use crate::builder::BuildReport;
use crate::processor::ProcessorError;
use crate::target::BuildTarget;

/// Build arguments as passed on the command line (`-buildNumber 0001`).
///
/// Unknown keys are ignored.
pub type BuildArgs = BTreeMap<String, String>;

/// Phase of a build transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
  Idle,
  Validating,
  SnapshotTaken,
  Applying,
  Building,
  Unwinding,
  Done,
}

impl fmt::Display for BuildPhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      BuildPhase::Idle => "idle",
      BuildPhase::Validating => "validating",
      BuildPhase::SnapshotTaken => "snapshot_taken",
      BuildPhase::Applying => "applying",
      BuildPhase::Building => "building",
      BuildPhase::Unwinding => "unwinding",
      BuildPhase::Done => "done",
    };
    f.write_str(name)
  }
}

/// A processor whose `restore()` failed during unwind.
#[derive(Debug)]
pub struct RestoreFailure {
  pub processor: String,
  pub error: ProcessorError,
}

impl fmt::Display for RestoreFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.processor, self.error)
  }
}

/// Restore failures collected during one unwind, in unwind order.
#[derive(Debug, Default)]
pub struct RestoreFailures(pub Vec<RestoreFailure>);

impl RestoreFailures {
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &RestoreFailure> {
    self.0.iter()
  }

  /// Names of the processors that failed to restore.
  pub fn processors(&self) -> Vec<&str> {
    self.0.iter().map(|f| f.processor.as_str()).collect()
  }

  /// Suffix appended to an error message when restores also failed.
  pub fn suffix(&self) -> String {
    if self.is_empty() {
      String::new()
    } else {
      format!(" (restore also failed: {self})")
    }
  }
}

impl fmt::Display for RestoreFailures {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, failure) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{failure}")?;
    }
    Ok(())
  }
}

/// Result of a successful build transaction.
#[derive(Debug)]
pub struct BuildOutcome {
  pub report: BuildReport,
  /// Display names of the processors that were applied, in apply order.
  pub applied: Vec<String>,
}

/// Errors that end a build transaction.
///
/// Every variant is raised only after the environment has been restored;
/// `restore_failures` lists processors whose undo did not succeed.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The project's active target does not match the configuration.
  #[error("active build target is {active}, but the configuration targets {configured}")]
  TargetMismatch { active: BuildTarget, configured: BuildTarget },

  /// A build argument could not be parsed.
  #[error("invalid value {value:?} for {key}: {source}")]
  InvalidArgument {
    key: String,
    value: String,
    #[source]
    source: ParseIntError,
  },

  /// A processor's `apply()` failed; the external build was skipped.
  #[error("processor {processor} failed to apply: {source}{}", .restore_failures.suffix())]
  ProcessorApply {
    processor: String,
    #[source]
    source: ProcessorError,
    restore_failures: RestoreFailures,
  },

  /// The external build failed or was cancelled.
  #[error("build failed: {summary}{}", .restore_failures.suffix())]
  ExternalBuild {
    summary: String,
    report: Option<BuildReport>,
    restore_failures: RestoreFailures,
  },

  /// The build succeeded but some processors could not be restored.
  #[error("build succeeded but restore failed: {failures}")]
  PartialUnwind {
    report: BuildReport,
    failures: RestoreFailures,
  },
}

impl BuildError {
  /// Restore failures recorded alongside this error.
  pub fn restore_failures(&self) -> Option<&RestoreFailures> {
    match self {
      BuildError::ProcessorApply { restore_failures, .. } | BuildError::ExternalBuild { restore_failures, .. } => {
        Some(restore_failures)
      }
      BuildError::PartialUnwind { failures, .. } => Some(failures),
      BuildError::TargetMismatch { .. } | BuildError::InvalidArgument { .. } => None,
    }
  }

  /// Whether some processor mutation may still be in effect.
  pub fn is_dirty(&self) -> bool {
    self.restore_failures().is_some_and(|f| !f.is_empty())
  }
}
