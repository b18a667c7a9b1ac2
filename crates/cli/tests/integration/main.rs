mod common;

#[cfg(unix)]
mod build_tests;
mod migrate_tests;
mod secret_tests;
