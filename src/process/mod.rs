//! Managed application lifecycle
//!
//! The suite runner only needs to start an app and later stop it again.
//! [`AppLauncher`] is that seam; [`ProcessLauncher`] implements it with
//! real child processes.

mod launcher;

use async_trait::async_trait;
use serde::Deserialize;

use crate::common::Result;

pub use launcher::{ProcessLauncher, RunningApp};

/// A server process the suite starts before querying it
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ManagedApp {
    pub name: String,
    /// Executable path, or a bare name looked up in PATH
    pub binary: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Starts and stops managed apps
#[async_trait]
pub trait AppLauncher: Send + Sync {
    /// Handle to a started app, handed back to `stop`
    type Handle: Send + 'static;

    /// Start the app; returns as soon as the process is spawned
    async fn start(&self, app: &ManagedApp) -> Result<Self::Handle>;

    /// Stop a previously started app
    async fn stop(&self, handle: Self::Handle) -> Result<()>;
}
