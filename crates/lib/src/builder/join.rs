//! Reconciling the two completion signals of an external build.
//!
//! A builder process signals completion twice: it exits, and it may write a
//! report file. The two arrive independently and in no guaranteed order
//! (a detached packager can write its report after the launcher exits).
//! [`OutcomeJoin`] records whichever arrives and resolves the outcome from
//! the final state only, never from arrival order.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::BuildResult;

/// How the builder process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
  Exited { code: Option<i32> },
  Cancelled,
  TimedOut(Duration),
}

/// Report written by the builder process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFile {
  pub result: BuildResult,
  #[serde(default)]
  pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeJoin {
  exit: Option<ProcessExit>,
  report: Option<ReportFile>,
}

impl OutcomeJoin {
  pub fn observe_exit(&mut self, exit: ProcessExit) {
    self.exit = Some(exit);
  }

  pub fn observe_report(&mut self, report: ReportFile) {
    self.report = Some(report);
  }

  /// Whether a report can still change the outcome.
  ///
  /// Once the process was cancelled or timed out, the outcome is decided.
  pub fn awaits_report(&self) -> bool {
    self.report.is_none() && !matches!(self.exit, Some(ProcessExit::Cancelled | ProcessExit::TimedOut(_)))
  }

  /// Resolve the outcome from whatever has been observed.
  pub fn resolve(&self) -> (BuildResult, String) {
    match (self.exit, &self.report) {
      (Some(ProcessExit::Cancelled), _) => (BuildResult::Cancelled, "cancelled before the build finished".to_string()),
      (Some(ProcessExit::TimedOut(limit)), _) => (
        BuildResult::Failed,
        format!("builder timed out after {}s", limit.as_secs()),
      ),
      (Some(ProcessExit::Exited { code: Some(0) }), Some(report)) => (report.result, report.summary.clone()),
      (Some(ProcessExit::Exited { code: Some(0) }), None) => {
        (BuildResult::Succeeded, "builder exited successfully without a report".to_string())
      }
      (Some(ProcessExit::Exited { code }), Some(report)) if report.result != BuildResult::Succeeded => {
        (BuildResult::Failed, with_exit_code(&report.summary, code))
      }
      (Some(ProcessExit::Exited { code }), Some(_)) => (
        BuildResult::Failed,
        format!("report claims success but {}", describe_exit(code)),
      ),
      (Some(ProcessExit::Exited { code }), None) => (BuildResult::Failed, describe_exit(code)),
      (None, Some(report)) if report.result != BuildResult::Succeeded => (report.result, report.summary.clone()),
      (None, _) => (BuildResult::Failed, "builder did not exit".to_string()),
    }
  }
}

fn describe_exit(code: Option<i32>) -> String {
  match code {
    Some(code) => format!("builder exited with status {code}"),
    None => "builder was terminated by a signal".to_string(),
  }
}

fn with_exit_code(summary: &str, code: Option<i32>) -> String {
  if summary.is_empty() {
    describe_exit(code)
  } else {
    format!("{summary} ({})", describe_exit(code))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn report(result: BuildResult, summary: &str) -> ReportFile {
    ReportFile {
      result,
      summary: summary.to_string(),
    }
  }

  fn resolve_both_orders(exit: ProcessExit, file: ReportFile) -> (BuildResult, String) {
    let mut exit_first = OutcomeJoin::default();
    exit_first.observe_exit(exit);
    exit_first.observe_report(file.clone());

    let mut report_first = OutcomeJoin::default();
    report_first.observe_report(file);
    report_first.observe_exit(exit);

    let resolved = exit_first.resolve();
    assert_eq!(resolved, report_first.resolve());
    resolved
  }

  #[test]
  fn successful_exit_uses_report_summary() {
    let (result, summary) = resolve_both_orders(
      ProcessExit::Exited { code: Some(0) },
      report(BuildResult::Succeeded, "42 MB player"),
    );
    assert_eq!(result, BuildResult::Succeeded);
    assert_eq!(summary, "42 MB player");
  }

  #[test]
  fn failed_report_wins_over_successful_exit() {
    let (result, summary) = resolve_both_orders(
      ProcessExit::Exited { code: Some(0) },
      report(BuildResult::Failed, "shader compile error"),
    );
    assert_eq!(result, BuildResult::Failed);
    assert_eq!(summary, "shader compile error");
  }

  #[test]
  fn failing_exit_wins_over_successful_report() {
    let (result, summary) = resolve_both_orders(
      ProcessExit::Exited { code: Some(2) },
      report(BuildResult::Succeeded, "done"),
    );
    assert_eq!(result, BuildResult::Failed);
    assert!(summary.contains("status 2"));
  }

  #[test]
  fn failing_exit_keeps_report_summary() {
    let (result, summary) = resolve_both_orders(
      ProcessExit::Exited { code: Some(1) },
      report(BuildResult::Failed, "out of disk"),
    );
    assert_eq!(result, BuildResult::Failed);
    assert_eq!(summary, "out of disk (builder exited with status 1)");
  }

  #[test]
  fn cancellation_overrides_any_report() {
    let (result, _) = resolve_both_orders(ProcessExit::Cancelled, report(BuildResult::Succeeded, "done"));
    assert_eq!(result, BuildResult::Cancelled);
  }

  #[test]
  fn timeout_is_a_failure_not_a_cancellation() {
    let mut join = OutcomeJoin::default();
    join.observe_exit(ProcessExit::TimedOut(Duration::from_secs(3600)));
    assert!(!join.awaits_report());
    let (result, summary) = join.resolve();
    assert_eq!(result, BuildResult::Failed);
    assert_eq!(summary, "builder timed out after 3600s");
  }

  #[test]
  fn clean_exit_without_report_succeeds() {
    let mut join = OutcomeJoin::default();
    join.observe_exit(ProcessExit::Exited { code: Some(0) });
    assert!(join.awaits_report());
    assert_eq!(join.resolve().0, BuildResult::Succeeded);
  }
}
