//! Test utilities for buildtool-lib.
//!
//! Provides shell helpers for tests that spawn a builder process, and a
//! recording processor whose every lifecycle step is logged so tests can
//! assert on ordering.

use std::sync::{Arc, Mutex};

use crate::environment::BuildEnvironment;
use crate::options::BuildOptions;
use crate::processor::{BuildProcessor, ProcessorContext, ProcessorError, ProcessorTemplate};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Processor context for the environment's active target, without storage.
pub fn context(env: &mut BuildEnvironment) -> ProcessorContext<'_> {
  ProcessorContext {
    target: env.active_target,
    config_name: "test",
    env,
    storage: None,
  }
}

/// Shared, ordered log of processor lifecycle events.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
  pub fn push(&self, event: impl Into<String>) {
    self.0.lock().unwrap().push(event.into());
  }

  pub fn events(&self) -> Vec<String> {
    self.0.lock().unwrap().clone()
  }

  /// Events with the given prefix, prefix stripped.
  pub fn events_of(&self, prefix: &str) -> Vec<String> {
    self
      .events()
      .into_iter()
      .filter_map(|e| e.strip_prefix(&format!("{prefix}:")).map(str::to_string))
      .collect()
  }
}

/// Template producing a [`RecordingProcessor`].
#[derive(Debug, Clone)]
pub struct RecordingTemplate {
  pub name: String,
  pub fail_apply: bool,
  pub fail_restore: bool,
  pub fail_preprocess: bool,
  pub recorder: Recorder,
}

impl RecordingTemplate {
  pub fn ok(name: &str, recorder: &Recorder) -> Self {
    Self {
      name: name.to_string(),
      fail_apply: false,
      fail_restore: false,
      fail_preprocess: false,
      recorder: recorder.clone(),
    }
  }

  pub fn failing_apply(name: &str, recorder: &Recorder) -> Self {
    Self {
      fail_apply: true,
      ..Self::ok(name, recorder)
    }
  }

  pub fn failing_restore(name: &str, recorder: &Recorder) -> Self {
    Self {
      fail_restore: true,
      ..Self::ok(name, recorder)
    }
  }

  pub fn failing_preprocess(name: &str, recorder: &Recorder) -> Self {
    Self {
      fail_preprocess: true,
      ..Self::ok(name, recorder)
    }
  }
}

impl ProcessorTemplate for RecordingTemplate {
  fn instantiate(&self) -> Box<dyn BuildProcessor> {
    self.recorder.push(format!("create:{}", self.name));
    Box::new(RecordingProcessor {
      template: self.clone(),
      previous_defines: None,
    })
  }
}

/// Processor that appends its name to the target group's scripting defines and
/// logs every step.
pub struct RecordingProcessor {
  template: RecordingTemplate,
  previous_defines: Option<Option<Vec<String>>>,
}

impl BuildProcessor for RecordingProcessor {
  fn name(&self) -> &str {
    &self.template.name
  }

  fn kind(&self) -> &'static str {
    "recording"
  }

  fn apply(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    self.template.recorder.push(format!("apply:{}", self.template.name));
    if self.template.fail_apply {
      return Err(ProcessorError::Precondition(format!("{} refused to apply", self.template.name)));
    }
    let group = ctx.target.group();
    self.previous_defines = Some(ctx.env.player.scripting_defines.get(&group).cloned());
    ctx
      .env
      .player
      .scripting_defines
      .entry(group)
      .or_default()
      .push(self.template.name.to_uppercase());
    Ok(())
  }

  fn restore(&mut self, ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    self.template.recorder.push(format!("restore:{}", self.template.name));
    if self.template.fail_restore {
      return Err(ProcessorError::Precondition(format!("{} refused to restore", self.template.name)));
    }
    let previous = self.previous_defines.take().ok_or(ProcessorError::NotApplied)?;
    match previous {
      Some(defines) => ctx.env.player.scripting_defines.insert(ctx.target.group(), defines),
      None => ctx.env.player.scripting_defines.remove(&ctx.target.group()),
    };
    Ok(())
  }

  fn contribute_to_options(&self, mut options: BuildOptions) -> BuildOptions {
    self.template.recorder.push(format!("contribute:{}", self.template.name));
    options.scenes.push(format!("scene-from-{}", self.template.name));
    options
  }

  fn preprocess_build(&mut self, _ctx: &mut ProcessorContext<'_>) -> Result<(), ProcessorError> {
    self.template.recorder.push(format!("preprocess:{}", self.template.name));
    if self.template.fail_preprocess {
      return Err(ProcessorError::Precondition(format!("{} preprocess failed", self.template.name)));
    }
    Ok(())
  }
}

impl Drop for RecordingProcessor {
  fn drop(&mut self) {
    self.template.recorder.push(format!("drop:{}", self.template.name));
  }
}
