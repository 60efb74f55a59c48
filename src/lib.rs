//! Metrics E2E - an end-to-end validation harness for metrics-query APIs
//!
//! This library starts the servers under test, replays scripted HTTP
//! queries against them and checks every response against its expected
//! status, content type and body.

pub mod cli;
pub mod commands;
pub mod common;
pub mod process;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testing::{run_suite, ScriptedQuery, SuiteReport, TestSchema};
