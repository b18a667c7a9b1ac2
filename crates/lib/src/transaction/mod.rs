//! Build transactions.
//!
//! A build runs as a transaction over the project's [`BuildEnvironment`]:
//!
//! 1. **Validating** - target check and build-argument parsing, no side effects
//! 2. **SnapshotTaken** - ambient settings captured, processors instantiated
//! 3. **Applying** - build number written, processors applied in order
//! 4. **Building** - preprocess hooks, then the external builder
//! 5. **Unwinding** - applied processors restored in reverse, snapshot restored
//!
//! Unwinding always runs exactly once, whatever happened before it. When it
//! completes, the environment is back to its pre-build state apart from
//! processors whose restore failed; those are reported on the error.
//!
//! Only one transaction may run against an environment at a time. The
//! `&mut BuildEnvironment` borrow enforces this within a process.
//!
//! # Submodules
//!
//! - [`ledger`] - record of applied processors
//! - [`types`] - phases, outcomes and errors

pub mod ledger;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::builder::{BuildReport, PlatformBuilder};
use crate::config::BuildConfiguration;
use crate::consts::{BUILD_NUMBER_ARG, DEFAULT_BUILD_DIR, OUTPUT_DIR_ARG};
use crate::environment::{BuildEnvironment, EnvironmentScope};
use crate::options::BuildOptions;
use crate::processor::{ProcessorContext, ProcessorError, ProcessorPool, ProcessorTemplate};
use crate::storage::{EncryptedItem, EncryptedStorage};

pub use ledger::UndoLedger;
pub use types::{BuildArgs, BuildError, BuildOutcome, BuildPhase, RestoreFailure, RestoreFailures};

/// Build number parsed from [`BUILD_NUMBER_ARG`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildNumber {
  /// The argument as given, written verbatim where a string is expected.
  pub raw: String,
  /// Integer form, at least 1.
  pub code: i32,
}

impl BuildNumber {
  /// Parse the build number argument, if present.
  pub fn from_args(args: &BuildArgs) -> Result<Option<Self>, BuildError> {
    let Some(raw) = args.get(BUILD_NUMBER_ARG) else {
      return Ok(None);
    };
    let code = raw
      .trim()
      .parse::<i32>()
      .map_err(|source| BuildError::InvalidArgument {
        key: BUILD_NUMBER_ARG.to_string(),
        value: raw.clone(),
        source,
      })?;
    Ok(Some(Self {
      raw: raw.clone(),
      code: code.max(1),
    }))
  }

  fn write_to(&self, env: &mut BuildEnvironment) {
    env.player.ios_build_number = self.raw.clone();
    env.player.android_bundle_version_code = self.code;
    info!(build_number = %self.raw, version_code = self.code, "build number set");
  }
}

/// Where the external builder writes its output.
///
/// The configured path, or `build/<name>` when blank. An `-outputDir`
/// argument replaces everything but the final component.
pub fn output_path<P>(config: &BuildConfiguration<P>, args: &BuildArgs) -> PathBuf {
  let configured = match config.output_path.as_deref() {
    Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
    _ => Path::new(DEFAULT_BUILD_DIR).join(&config.name),
  };

  match args.get(OUTPUT_DIR_ARG).map(|dir| dir.trim()) {
    Some(dir) if !dir.is_empty() => match configured.file_name() {
      Some(name) => Path::new(dir).join(name),
      None => PathBuf::from(dir),
    },
    _ => configured,
  }
}

struct PhaseTracker<'a> {
  config: &'a str,
  phase: BuildPhase,
}

impl<'a> PhaseTracker<'a> {
  fn new(config: &'a str) -> Self {
    Self {
      config,
      phase: BuildPhase::Idle,
    }
  }

  fn advance(&mut self, next: BuildPhase) {
    debug!(config = %self.config, from = %self.phase, to = %next, "build phase");
    self.phase = next;
  }
}

/// Why the transaction stopped before a successful build.
enum Interrupted {
  Apply {
    processor: String,
    source: ProcessorError,
  },
  External {
    summary: String,
    report: Option<BuildReport>,
  },
}

/// Run one build transaction.
///
/// See the module documentation for the phases. On return the environment
/// has been restored to its state before the call.
pub fn run<P, B>(
  config: &BuildConfiguration<P>,
  env: &mut BuildEnvironment,
  args: &BuildArgs,
  builder: &mut B,
  storage: Option<&dyn EncryptedStorage<EncryptedItem>>,
) -> Result<BuildOutcome, BuildError>
where
  P: ProcessorTemplate,
  B: PlatformBuilder + ?Sized,
{
  let mut phase = PhaseTracker::new(&config.name);
  info!(config = %config.name, target = %config.target, processors = config.processors.len(), "starting build");

  phase.advance(BuildPhase::Validating);
  if env.active_target != config.target {
    return Err(BuildError::TargetMismatch {
      active: env.active_target,
      configured: config.target,
    });
  }
  let build_number = BuildNumber::from_args(args)?;

  let mut options = BuildOptions::new(env.project().resolve(&output_path(config, args)), config.target);
  options.flags = config.flags.clone();
  options.scenes = env.scenes.clone();

  phase.advance(BuildPhase::SnapshotTaken);
  let mut scope = EnvironmentScope::enter(env);
  let mut pool = ProcessorPool::instantiate(&config.processors);
  let mut ledger = UndoLedger::new();

  phase.advance(BuildPhase::Applying);
  if let Some(number) = &build_number {
    number.write_to(&mut scope);
  }

  let mut ctx = ProcessorContext {
    target: config.target,
    config_name: &config.name,
    env: &mut *scope,
    storage,
  };

  let result = match apply_all(&mut pool, &mut ledger, &mut ctx, options) {
    Ok(options) => {
      phase.advance(BuildPhase::Building);
      build(&mut pool, &ledger, &mut ctx, builder, &options)
    }
    Err(interrupted) => Err(interrupted),
  };

  let names = pool.names();
  let applied: Vec<String> = ledger.iter().filter_map(|i| names.get(i).cloned()).collect();

  phase.advance(BuildPhase::Unwinding);
  let failures = unwind(&mut pool, &mut ledger, &mut ctx);
  scope.finish();
  pool.destroy();

  phase.advance(BuildPhase::Done);
  finalize(result, failures, applied)
}

fn apply_all(
  pool: &mut ProcessorPool,
  ledger: &mut UndoLedger,
  ctx: &mut ProcessorContext<'_>,
  mut options: BuildOptions,
) -> Result<BuildOptions, Interrupted> {
  for index in 0..pool.len() {
    let Some(processor) = pool.get_mut(index) else {
      continue;
    };

    info!(processor = %processor.name(), kind = processor.kind(), "applying processor");
    if let Err(source) = processor.apply(ctx) {
      error!(processor = %processor.name(), error = %source, "processor failed to apply");
      return Err(Interrupted::Apply {
        processor: processor.name().to_string(),
        source,
      });
    }

    ledger.push(index);
    options = processor.contribute_to_options(options);
  }
  Ok(options)
}

fn build<B>(
  pool: &mut ProcessorPool,
  ledger: &UndoLedger,
  ctx: &mut ProcessorContext<'_>,
  builder: &mut B,
  options: &BuildOptions,
) -> Result<BuildReport, Interrupted>
where
  B: PlatformBuilder + ?Sized,
{
  for index in ledger.iter() {
    let Some(processor) = pool.get_mut(index) else {
      continue;
    };
    if let Err(err) = processor.preprocess_build(ctx) {
      error!(processor = %processor.name(), error = %err, "preprocess hook failed");
      return Err(Interrupted::External {
        summary: format!("preprocess hook of {} failed: {err}", processor.name()),
        report: None,
      });
    }
  }

  info!(output = %options.output_path.display(), target = %options.target, "invoking builder");
  match builder.build(options) {
    Ok(report) if report.is_success() => {
      info!(summary = %report.summary, duration = ?report.duration, "build succeeded");
      Ok(report)
    }
    Ok(report) => {
      error!(result = %report.result, summary = %report.summary, "build did not succeed");
      Err(Interrupted::External {
        summary: report.summary.clone(),
        report: Some(report),
      })
    }
    Err(err) => {
      error!(error = %err, "builder failed");
      Err(Interrupted::External {
        summary: err.to_string(),
        report: None,
      })
    }
  }
}

fn unwind(pool: &mut ProcessorPool, ledger: &mut UndoLedger, ctx: &mut ProcessorContext<'_>) -> RestoreFailures {
  let mut failures = Vec::new();
  for index in ledger.pop_all() {
    let Some(processor) = pool.get_mut(index) else {
      continue;
    };

    debug!(processor = %processor.name(), "restoring processor");
    if let Err(error) = processor.restore(ctx) {
      error!(processor = %processor.name(), error = %error, "processor failed to restore");
      failures.push(RestoreFailure {
        processor: processor.name().to_string(),
        error,
      });
    }
  }
  RestoreFailures(failures)
}

fn finalize(
  result: Result<BuildReport, Interrupted>,
  failures: RestoreFailures,
  applied: Vec<String>,
) -> Result<BuildOutcome, BuildError> {
  match result {
    Ok(report) if failures.is_empty() => Ok(BuildOutcome { report, applied }),
    Ok(report) => {
      warn!(processors = ?failures.processors(), "build succeeded with restore failures");
      Err(BuildError::PartialUnwind { report, failures })
    }
    Err(Interrupted::Apply { processor, source }) => Err(BuildError::ProcessorApply {
      processor,
      source,
      restore_failures: failures,
    }),
    Err(Interrupted::External { summary, report }) => Err(BuildError::ExternalBuild {
      summary,
      report,
      restore_failures: failures,
    }),
  }
}
