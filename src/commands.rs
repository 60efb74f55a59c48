//! CLI command definitions
//!
//! Defines the clap commands for the e2e harness.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a suite against the configured apps
    Run {
        /// Path to the YAML suite definition
        suite: PathBuf,

        /// Do not start or stop the suite's apps (they are already running)
        #[arg(long)]
        no_apps: bool,

        /// Harness configuration file (default: platform config dir)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load and validate a suite definition without running it
    Check {
        /// Path to the YAML suite definition
        suite: PathBuf,
    },
}
