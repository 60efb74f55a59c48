//! Metrics E2E - scripted end-to-end checks for metrics-query APIs
//!
//! Exit codes: 0 when every query passed, 1 when any query failed,
//! 2 when the suite or configuration could not be loaded.

use clap::Parser;
use metrics_e2e::{cli, commands, common::logging};
use commands::Commands;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "metrics-e2e", about = "End-to-end checks for metrics-query APIs")]
#[command(version, long_about = None)]
struct Cli {
    /// Log request and app output details
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let guard = match logging::init_cli(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    let code = match cli::dispatch(cli.command).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("Error: {e}");
            2
        }
    };

    // Flush the log file before exiting
    drop(guard);
    std::process::exit(code);
}
