//! buildtool-lib: Core types and logic for buildtool
//!
//! This crate runs build transactions for a project:
//! - `BuildConfiguration`: a target plus an ordered list of processors
//! - `BuildProcessor`: a reversible mutation of the build environment
//! - `EnvironmentScope`: snapshot of ambient settings restored on every exit path
//! - `transaction`: apply processors, invoke the external builder, unwind
//! - `storage`: encrypted secrets consumed by processors

pub mod builder;
pub mod config;
pub mod consts;
pub mod environment;
pub mod options;
pub mod processor;
pub mod project;
pub mod settings;
pub mod storage;
pub mod target;
pub mod transaction;
pub mod util;
pub mod wait;
