//! Build metadata written into the project before building.
//!
//! The file is read by the shipped application at runtime, so it is
//! written in the preprocess hook and intentionally left in place.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::processor::{BuildProcessor, ProcessorContext, ProcessorError};
use crate::target::BuildTarget;
use crate::util::fs::write_atomic;

/// Contents of the build info file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
  pub build_number: String,
  pub target: BuildTarget,
  pub application_identifier: Option<String>,
  pub config: String,
}

pub struct AddBuildInfo {
  name: String,
  path: PathBuf,
}

impl AddBuildInfo {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    let path = path.into();
    Self {
      name: format!("add_build_info({})", path.display()),
      path,
    }
  }
}

impl BuildProcessor for AddBuildInfo {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> &'static str {
    "add_build_info"
  }

  fn apply(&mut self, _ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    Ok(())
  }

  fn restore(&mut self, _ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    Ok(())
  }

  fn preprocess_build(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    let info = BuildInfo {
      build_number: ctx.env.build_number_for(ctx.target),
      target: ctx.target,
      application_identifier: ctx.env.application_identifier(ctx.target.group()).map(str::to_string),
      config: ctx.config_name.to_string(),
    };

    let path = ctx.env.project().resolve(&self.path);
    let content = serde_json::to_string_pretty(&info)?;
    write_atomic(&path, content)?;

    info!(build_number = %info.build_number, path = %path.display(), "build info written");
    Ok(())
  }
}
