//! Shared utilities.
//!
//! Atomic file writes used by every persisted file, plus test helpers.

pub mod fs;

#[cfg(test)]
pub mod testutil;
