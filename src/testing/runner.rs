//! Suite runner implementation
//!
//! Starts the managed apps, sends every scripted query strictly in order,
//! then stops the apps again and reports a single verdict.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use tokio::task::JoinSet;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::process::{AppLauncher, ManagedApp};

use super::config::TestSchema;
use super::query::QueryExecutor;

/// Outcome of a suite run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteReport {
    pub queries_total: usize,
    pub queries_failed: usize,
    /// Failure descriptions per failed query, keyed by 1-based query number
    pub failures: Vec<(usize, Vec<String>)>,
}

impl SuiteReport {
    /// The suite verdict: true when any query failed
    pub fn failed(&self) -> bool {
        self.queries_failed > 0
    }
}

/// Load a suite definition from a YAML file
pub fn load_suite(path: &Path) -> Result<TestSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Run every query of a suite
///
/// Unless `skip_apps` is set, the suite's apps are started first and
/// stopped once all queries are done. App start and stop problems are
/// logged but never change the verdict.
pub async fn run_suite<L>(
    config: &Config,
    suite: &TestSchema,
    skip_apps: bool,
    launcher: Arc<L>,
) -> SuiteReport
where
    L: AppLauncher + 'static,
{
    tracing::info!(
        apps = suite.apps.len(),
        queries = suite.queries.len(),
        skip_apps,
        "will run test"
    );

    let running = if skip_apps {
        HashMap::new()
    } else {
        let running = start_apps(&launcher, &suite.apps).await;
        let grace = config.startup_grace();
        tracing::info!(
            grace_secs = grace.as_secs(),
            "waiting for all required apps to start"
        );
        tokio::time::sleep(grace).await;
        running
    };

    let executor = QueryExecutor::new();
    let mut report = SuiteReport {
        queries_total: suite.queries.len(),
        ..SuiteReport::default()
    };

    for (i, query) in suite.queries.iter().enumerate() {
        let query_num = i + 1;
        let failures = executor.execute(query).await;
        let label = format!("{} {}{}", query.method, query.endpoint, query.path);

        if failures.is_empty() {
            tracing::info!(query = query_num, "test OK");
            println!("  {} Query {}: {}", "✓".green(), query_num, label.dimmed());
        } else {
            tracing::error!(query = query_num, ?failures, "test failed");
            println!("  {} Query {}: {}", "✗".red(), query_num, label);
            for failure in &failures {
                println!("      {}", failure.red());
            }
            report.queries_failed += 1;
            report.failures.push((query_num, failures));
        }
    }

    if !running.is_empty() {
        tracing::info!(apps = running.len(), "shutting down running applications");
    }
    stop_apps(&launcher, running).await;

    if report.failed() {
        tracing::error!(
            failed = report.queries_failed,
            total = report.queries_total,
            "tests failed"
        );
    } else {
        tracing::info!(total = report.queries_total, "all tests OK");
    }

    report
}

/// Start every app concurrently, keyed by app name
///
/// Apps that fail to start are logged and left out of the map.
async fn start_apps<L>(launcher: &Arc<L>, apps: &[ManagedApp]) -> HashMap<String, L::Handle>
where
    L: AppLauncher + 'static,
{
    let mut tasks = JoinSet::new();
    for app in apps.iter().cloned() {
        let launcher = Arc::clone(launcher);
        tasks.spawn(async move {
            let result = launcher.start(&app).await;
            (app.name, result)
        });
    }

    let mut running = HashMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((name, Ok(handle))) => {
                running.insert(name, handle);
            }
            Ok((name, Err(e))) => {
                tracing::error!(app = %name, error = %e, "failed to start app");
            }
            Err(e) => {
                tracing::error!(error = %e, "app start task failed");
            }
        }
    }
    running
}

async fn stop_apps<L>(launcher: &Arc<L>, running: HashMap<String, L::Handle>)
where
    L: AppLauncher + 'static,
{
    for (name, handle) in running {
        if let Err(e) = launcher.stop(handle).await {
            tracing::warn!(app = %name, error = %e, "failed to stop app");
        }
    }
}
