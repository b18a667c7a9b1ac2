//! Processors adjusting build flags.

use crate::environment::CurrentBuildSettings;
use crate::options::BuildOptions;
use crate::processor::{BuildProcessor, ProcessorContext, ProcessorError};

/// Toggles development flags on the builder options.
///
/// Touches only the options, so apply and restore are no-ops.
pub struct DevelopmentBuild {
  name: String,
  enabled: bool,
  allow_debugging: bool,
}

impl DevelopmentBuild {
  pub fn new(enabled: bool, allow_debugging: bool) -> Self {
    Self {
      name: format!("development_build({enabled})"),
      enabled,
      allow_debugging,
    }
  }
}

impl BuildProcessor for DevelopmentBuild {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> &'static str {
    "development_build"
  }

  fn apply(&mut self, _ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    Ok(())
  }

  fn restore(&mut self, _ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    Ok(())
  }

  fn contribute_to_options(&self, mut options: BuildOptions) -> BuildOptions {
    options.flags.development = self.enabled;
    options.flags.allow_debugging = self.enabled && self.allow_debugging;
    options
  }
}

/// Overrides the per-build export compliance flags.
pub struct ExportCompliance {
  name: String,
  uses_non_exempt_encryption: Option<bool>,
  add_gradle_wrapper: Option<bool>,
  previous: Option<CurrentBuildSettings>,
}

impl ExportCompliance {
  pub fn new(uses_non_exempt_encryption: Option<bool>, add_gradle_wrapper: Option<bool>) -> Self {
    Self {
      name: "export_compliance".to_string(),
      uses_non_exempt_encryption,
      add_gradle_wrapper,
      previous: None,
    }
  }
}

impl BuildProcessor for ExportCompliance {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> &'static str {
    "export_compliance"
  }

  fn apply(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    self.previous = Some(ctx.env.current.clone());
    if let Some(value) = self.uses_non_exempt_encryption {
      ctx.env.current.uses_non_exempt_encryption = value;
    }
    if let Some(value) = self.add_gradle_wrapper {
      ctx.env.current.add_gradle_wrapper = value;
    }
    Ok(())
  }

  fn restore(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    ctx.env.current = self.previous.take().ok_or(ProcessorError::NotApplied)?;
    Ok(())
  }
}
