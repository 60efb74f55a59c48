//! CLI command handling
//!
//! Dispatches CLI commands to the suite runner and formats output.

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::Result;
use crate::process::ProcessLauncher;
use crate::testing::{load_suite, run_suite};

/// Dispatch a CLI command
///
/// Returns whether everything passed.
pub async fn dispatch(command: Commands) -> Result<bool> {
    match command {
        Commands::Run {
            suite,
            no_apps,
            config,
        } => {
            let config = match config {
                Some(path) => Config::load_from(&path)?,
                None => Config::load()?,
            };
            let schema = load_suite(&suite)?;

            println!(
                "\n{} {}",
                "Running Suite:".blue().bold(),
                suite.display().to_string().white().bold()
            );

            let launcher = Arc::new(ProcessLauncher::new(&config));
            let report = run_suite(&config, &schema, no_apps, launcher).await;

            if report.failed() {
                println!(
                    "\n{} {}\n",
                    "✗".red().bold(),
                    format!(
                        "{} of {} queries failed",
                        report.queries_failed, report.queries_total
                    )
                    .red()
                    .bold()
                );
            } else {
                println!(
                    "\n{} {}\n",
                    "✓".green().bold(),
                    format!("All {} queries passed", report.queries_total)
                        .green()
                        .bold()
                );
            }

            Ok(!report.failed())
        }

        Commands::Check { suite } => check_suite(&suite),
    }
}

fn check_suite(path: &Path) -> Result<bool> {
    let schema = load_suite(path)?;

    println!(
        "{} {}: {} app(s), {} query(ies)",
        "✓".green(),
        path.display(),
        schema.apps.len(),
        schema.queries.len()
    );
    for app in &schema.apps {
        println!("  app {} -> {}", app.name, app.binary.dimmed());
    }
    for (i, query) in schema.queries.iter().enumerate() {
        println!(
            "  query {}: {} {}{} (expect {} {})",
            i + 1,
            query.method,
            query.endpoint,
            query.path,
            query.expected.http_code,
            query.expected.content_type.dimmed()
        );
    }

    Ok(true)
}
