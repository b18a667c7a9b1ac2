//! The external build function.
//!
//! buildtool never compiles or packages anything itself. After all
//! processors are applied, the folded [`BuildOptions`] are handed to a
//! [`PlatformBuilder`], which reports success or failure with a summary.
//!
//! # Submodules
//!
//! - [`command`] - builder running an external process
//! - [`join`] - reconciles a process exit with its report file

pub mod command;
pub mod join;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::BuildOptions;

pub use command::CommandBuilder;
pub use join::{OutcomeJoin, ProcessExit, ReportFile};

/// Outcome tag of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildResult {
  Succeeded,
  Failed,
  Cancelled,
}

impl std::fmt::Display for BuildResult {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      BuildResult::Succeeded => write!(f, "succeeded"),
      BuildResult::Failed => write!(f, "failed"),
      BuildResult::Cancelled => write!(f, "cancelled"),
    }
  }
}

/// What the external builder reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
  pub result: BuildResult,
  /// Human-readable summary.
  pub summary: String,
  pub output_path: PathBuf,
  pub duration: Duration,
}

impl BuildReport {
  pub fn succeeded(options: &BuildOptions, summary: impl Into<String>) -> Self {
    Self::new(BuildResult::Succeeded, options, summary)
  }

  pub fn failed(options: &BuildOptions, summary: impl Into<String>) -> Self {
    Self::new(BuildResult::Failed, options, summary)
  }

  pub fn new(result: BuildResult, options: &BuildOptions, summary: impl Into<String>) -> Self {
    Self {
      result,
      summary: summary.into(),
      output_path: options.output_path.clone(),
      duration: Duration::ZERO,
    }
  }

  pub fn is_success(&self) -> bool {
    self.result == BuildResult::Succeeded
  }
}

/// Errors raised by a builder before it could produce a report.
#[derive(Debug, Error)]
pub enum BuilderError {
  #[error("failed to start builder {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to create async runtime: {0}")]
  Runtime(#[source] io::Error),

  #[error("failed to encode build options: {0}")]
  Options(#[source] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

/// The opaque, blocking external build function.
pub trait PlatformBuilder {
  fn build(&mut self, options: &BuildOptions) -> Result<BuildReport, BuilderError>;
}

impl<F> PlatformBuilder for F
where
  F: FnMut(&BuildOptions) -> Result<BuildReport, BuilderError>,
{
  fn build(&mut self, options: &BuildOptions) -> Result<BuildReport, BuilderError> {
    self(options)
  }
}
