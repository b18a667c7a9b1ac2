//! Cancellable, deadline-bounded waiting.
//!
//! Used wherever a step has to poll for an external condition (a report
//! file appearing, a host becoming ready). A wait ends in one of three
//! distinct ways: the condition holds, the host cancelled, or the
//! wall-clock deadline passed. Nothing here retries.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
  /// The host asked us to stop waiting.
  #[error("wait cancelled")]
  Cancelled,

  /// The condition did not hold before the deadline.
  #[error("timed out after {0:?}")]
  TimedOut(Duration),
}

/// Poll `condition` until it returns true.
///
/// The condition is checked before the first sleep, so an already-satisfied
/// condition returns immediately.
pub async fn wait_until<F>(
  mut condition: F,
  cancel: &CancellationToken,
  timeout: Duration,
  poll_interval: Duration,
) -> Result<(), WaitError>
where
  F: FnMut() -> bool,
{
  let deadline = Instant::now() + timeout;

  loop {
    if condition() {
      return Ok(());
    }
    if cancel.is_cancelled() {
      debug!("wait cancelled");
      return Err(WaitError::Cancelled);
    }
    if Instant::now() >= deadline {
      debug!(timeout = ?timeout, "wait timed out");
      return Err(WaitError::TimedOut(timeout));
    }

    tokio::select! {
      _ = cancel.cancelled() => {
        debug!("wait cancelled");
        return Err(WaitError::Cancelled);
      }
      _ = tokio::time::sleep(poll_interval) => {}
    }
  }
}
