//! Implementation of the `bt build` command.
//!
//! Loads a configuration (migrating legacy modifiers), runs it as a build
//! transaction against the project's environment and saves the restored
//! environment afterwards, whether or not the build succeeded.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::info;

use buildtool_lib::builder::CommandBuilder;
use buildtool_lib::config::load_configuration;
use buildtool_lib::consts::{BUILD_NUMBER_ARG, OUTPUT_DIR_ARG};
use buildtool_lib::environment::BuildEnvironment;
use buildtool_lib::project::ProjectPaths;
use buildtool_lib::settings::ToolSettings;
use buildtool_lib::storage::{EncryptedItem, EncryptedStorage};
use buildtool_lib::transaction::{BuildArgs, BuildError, BuildOutcome};

use super::{config_path, open_storage};
use crate::output::{
  OutputFormat, parse_key_value, print_error, print_json, print_stat, print_step, print_success, print_warning,
};

pub struct BuildCommand {
  pub config: String,
  pub build_number: Option<String>,
  pub output_dir: Option<String>,
  pub args: Vec<String>,
  pub builder: Option<String>,
  pub builder_args: Vec<String>,
  pub output: OutputFormat,
}

impl BuildCommand {
  /// Whether any build argument was given on the command line.
  fn has_explicit_args(&self) -> bool {
    !self.args.is_empty() || self.build_number.is_some() || self.output_dir.is_some()
  }

  /// Command-line arguments, or the local build arguments from the tool
  /// settings when none were given.
  fn build_args(&self, settings: &ToolSettings) -> BuildArgs {
    if !self.has_explicit_args() {
      return settings.local_build_args();
    }
    let mut args = BuildArgs::new();
    args.extend(self.args.iter().map(|arg| parse_key_value(arg)));
    if let Some(number) = &self.build_number {
      args.insert(BUILD_NUMBER_ARG.to_string(), number.clone());
    }
    if let Some(dir) = &self.output_dir {
      args.insert(OUTPUT_DIR_ARG.to_string(), dir.clone());
    }
    args
  }

  fn command_builder(&self, project: &ProjectPaths, settings: &ToolSettings) -> Result<CommandBuilder> {
    let builder = match &self.builder {
      Some(program) => CommandBuilder::new(program)
        .args(self.builder_args.iter().cloned())
        .timeout(Duration::from_secs(settings.builder.timeout_minutes.saturating_mul(60)))
        .report_grace(Duration::from_secs(settings.builder.report_grace_seconds)),
      None => match CommandBuilder::from_settings(&settings.builder) {
        Some(builder) => builder.args(self.builder_args.iter().cloned()),
        None => bail!("No builder configured: pass --builder or set [builder] program in the tool settings"),
      },
    };
    Ok(builder.working_dir(project.root()).cancel_on_interrupt(true))
  }
}

pub fn cmd_build(project: &ProjectPaths, cmd: BuildCommand) -> Result<()> {
  let settings = ToolSettings::load(project).context("Failed to load tool settings")?;
  let path = config_path(project, &settings, &cmd.config);
  let config = load_configuration(&path).with_context(|| format!("Failed to load configuration {}", path.display()))?;

  let mut env = BuildEnvironment::load_or_new(project, config.target, settings.current_build_settings())
    .context("Failed to load build environment")?;

  let args = cmd.build_args(&settings);
  let mut builder = cmd.command_builder(project, &settings)?;
  let storage = open_storage(project)?;
  let storage = storage.as_ref().map(|s| s as &dyn EncryptedStorage<EncryptedItem>);

  info!(config = %config.name, builder = %builder.program(), "building");
  let result = config.build(&mut env, &args, &mut builder, storage);

  let saved = env.save(project).context("Failed to save build environment");

  match result {
    Ok(outcome) => {
      saved?;
      if cmd.output.is_json() {
        print_json(&outcome_json(&config.name, &outcome))?;
      } else {
        print_outcome(&config.name, &outcome);
      }
      Ok(())
    }
    Err(err) => {
      report_failure(&err);
      if let Err(save_err) = saved {
        print_error(&format!("{:#}", save_err));
      }
      Err(err.into())
    }
  }
}

fn outcome_json(name: &str, outcome: &BuildOutcome) -> serde_json::Value {
  serde_json::json!({
    "config": name,
    "result": outcome.report.result,
    "summary": outcome.report.summary,
    "output_path": outcome.report.output_path,
    "duration_ms": outcome.report.duration.as_millis() as u64,
    "processors": outcome.applied,
  })
}

fn print_outcome(name: &str, outcome: &BuildOutcome) {
  print_success(&format!("Build {} succeeded", name));
  print_stat("Output", &outcome.report.output_path.display().to_string());
  print_stat("Duration", &humantime::format_duration(whole_millis(outcome.report.duration)).to_string());
  if !outcome.report.summary.is_empty() {
    print_stat("Summary", &outcome.report.summary);
  }
  if !outcome.applied.is_empty() {
    println!();
    println!("Processors:");
    for name in &outcome.applied {
      print_step(name);
    }
  }
}

fn report_failure(err: &BuildError) {
  print_error(&err.to_string());
  if let Some(failures) = err.restore_failures()
    && !failures.is_empty()
  {
    print_warning("Some processors could not be restored; the project may still carry their changes:");
    for failure in failures.iter() {
      print_step(&failure.to_string());
    }
  }
}

fn whole_millis(duration: Duration) -> Duration {
  Duration::from_millis(duration.as_millis() as u64)
}
