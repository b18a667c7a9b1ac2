//! Builder that runs an external packager process.
//!
//! The process receives two environment variables:
//! - `BUILDTOOL_OPTIONS` - path of a JSON file holding the [`BuildOptions`]
//! - `BUILDTOOL_REPORT` - path where it may write a [`ReportFile`]
//!
//! The wait on the child honors a cancellation token and a wall-clock
//! ceiling. Exit status and report are reconciled by [`OutcomeJoin`].

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::join::{OutcomeJoin, ProcessExit, ReportFile};
use super::{BuildReport, BuilderError, PlatformBuilder};
use crate::consts::{OPTIONS_ENV_VAR, REPORT_ENV_VAR};
use crate::options::BuildOptions;
use crate::settings::BuilderSettings;
use crate::wait::wait_until;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60);
const DEFAULT_REPORT_GRACE: Duration = Duration::from_secs(5);
const REPORT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct CommandBuilder {
  program: String,
  args: Vec<String>,
  working_dir: Option<PathBuf>,
  timeout: Duration,
  report_grace: Duration,
  cancel: CancellationToken,
  cancel_on_interrupt: bool,
}

impl CommandBuilder {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      working_dir: None,
      timeout: DEFAULT_TIMEOUT,
      report_grace: DEFAULT_REPORT_GRACE,
      cancel: CancellationToken::new(),
      cancel_on_interrupt: false,
    }
  }

  /// Builder from tool settings, or `None` if no program is configured.
  pub fn from_settings(settings: &BuilderSettings) -> Option<Self> {
    let program = settings.program.as_deref()?;
    Some(
      Self::new(program)
        .args(settings.args.iter().cloned())
        .timeout(Duration::from_secs(settings.timeout_minutes.saturating_mul(60)))
        .report_grace(Duration::from_secs(settings.report_grace_seconds)),
    )
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.working_dir = Some(dir.into());
    self
  }

  /// Wall-clock ceiling for the builder process.
  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// How long to keep looking for a report after the process exited.
  pub fn report_grace(mut self, grace: Duration) -> Self {
    self.report_grace = grace;
    self
  }

  pub fn cancel_token(mut self, token: CancellationToken) -> Self {
    self.cancel = token;
    self
  }

  /// Cancel the build when the process receives Ctrl-C.
  pub fn cancel_on_interrupt(mut self, enabled: bool) -> Self {
    self.cancel_on_interrupt = enabled;
    self
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  async fn run(&self, options: &BuildOptions) -> Result<BuildReport, BuilderError> {
    let started = Instant::now();
    let scratch = tempfile::tempdir()?;
    let options_path = scratch.path().join("options.json");
    let report_path = scratch.path().join("report.json");

    let options_json = serde_json::to_string_pretty(options).map_err(BuilderError::Options)?;
    tokio::fs::write(&options_path, options_json).await?;

    let mut command = Command::new(&self.program);
    command
      .args(&self.args)
      .env(OPTIONS_ENV_VAR, &options_path)
      .env(REPORT_ENV_VAR, &report_path)
      .stdin(Stdio::null())
      .kill_on_drop(true);
    if let Some(dir) = &self.working_dir {
      command.current_dir(dir);
    }

    info!(program = %self.program, target = %options.target, "starting builder");
    let mut child = command.spawn().map_err(|source| BuilderError::Spawn {
      program: self.program.clone(),
      source,
    })?;

    let interrupt = self.cancel_on_interrupt.then(|| {
      let token = self.cancel.clone();
      tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
          warn!("interrupt received, cancelling build");
          token.cancel();
        }
      })
    });

    enum Waited {
      Exited(std::io::Result<std::process::ExitStatus>),
      Cancelled,
      TimedOut,
    }

    let waited = tokio::select! {
      status = child.wait() => Waited::Exited(status),
      _ = self.cancel.cancelled() => Waited::Cancelled,
      _ = tokio::time::sleep(self.timeout) => Waited::TimedOut,
    };

    let mut join = OutcomeJoin::default();
    match waited {
      Waited::Exited(status) => {
        let status = status?;
        debug!(status = ?status.code(), "builder exited");
        join.observe_exit(ProcessExit::Exited { code: status.code() });
      }
      Waited::Cancelled => {
        warn!(program = %self.program, "builder cancelled");
        kill(&mut child).await;
        join.observe_exit(ProcessExit::Cancelled);
      }
      Waited::TimedOut => {
        warn!(program = %self.program, timeout = ?self.timeout, "builder timed out");
        kill(&mut child).await;
        join.observe_exit(ProcessExit::TimedOut(self.timeout));
      }
    }

    if let Some(handle) = interrupt {
      handle.abort();
    }

    if join.awaits_report() {
      let mut found = None;
      let waited = wait_until(
        || {
          found = read_report(&report_path);
          found.is_some()
        },
        &self.cancel,
        self.report_grace,
        REPORT_POLL_INTERVAL,
      )
      .await;
      match (found, waited) {
        (Some(report), _) => join.observe_report(report),
        (None, Err(err)) => debug!(error = %err, "no builder report"),
        (None, Ok(())) => {}
      }
    }

    let (result, summary) = join.resolve();
    let report = BuildReport {
      result,
      summary,
      output_path: options.output_path.clone(),
      duration: started.elapsed(),
    };
    info!(result = %report.result, summary = %report.summary, "builder finished");
    Ok(report)
  }
}

async fn kill(child: &mut tokio::process::Child) {
  if let Err(err) = child.kill().await {
    warn!(error = %err, "failed to kill builder process");
  }
}

/// Parse the report file if it exists and is complete.
fn read_report(path: &Path) -> Option<ReportFile> {
  let content = std::fs::read_to_string(path).ok()?;
  match serde_json::from_str(&content) {
    Ok(report) => Some(report),
    Err(err) => {
      debug!(error = %err, "report not readable yet");
      None
    }
  }
}

impl PlatformBuilder for CommandBuilder {
  fn build(&mut self, options: &BuildOptions) -> Result<BuildReport, BuilderError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .map_err(BuilderError::Runtime)?;
    runtime.block_on(self.run(options))
  }
}
