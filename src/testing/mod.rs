//! E2E suite runner
//!
//! Reads YAML suite definitions, sends each scripted query to the API under
//! test and validates the responses: images by SHA-256 digest, JSON render
//! output by structural comparison of the returned series.

pub mod compare;
mod config;
pub mod datapoint;
pub mod query;
mod runner;
pub mod validate;

pub use compare::{compare, MetricSeries, Mismatch};
pub use config::*;
pub use datapoint::{decode_embedded, decode_pair, Sample};
pub use query::QueryExecutor;
pub use runner::{load_suite, run_suite, SuiteReport};
pub use validate::validate;
