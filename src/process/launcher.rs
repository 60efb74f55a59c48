//! Child-process implementation of [`AppLauncher`]

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use super::{AppLauncher, ManagedApp};
use crate::common::config::Config;
use crate::common::{Error, Result};

/// Launches managed apps as child processes
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    stop_timeout: Duration,
    forward_output: bool,
}

/// A spawned managed app
#[derive(Debug)]
pub struct RunningApp {
    pub name: String,
    child: Child,
}

impl RunningApp {
    /// OS process id, if the process has not been reaped yet
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}

impl ProcessLauncher {
    pub fn new(config: &Config) -> Self {
        Self {
            stop_timeout: config.stop_timeout(),
            forward_output: config.processes.forward_output,
        }
    }
}

#[async_trait]
impl AppLauncher for ProcessLauncher {
    type Handle = RunningApp;

    async fn start(&self, app: &ManagedApp) -> Result<RunningApp> {
        let binary = resolve_binary(app)?;

        let mut cmd = Command::new(&binary);
        cmd.args(&app.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if self.forward_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::app_start_failed(&app.name, e))?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(app.name.clone(), "stdout", stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(app.name.clone(), "stderr", stderr));
        }

        tracing::info!(
            app = %app.name,
            binary = %binary.display(),
            pid = child.id(),
            "started app"
        );

        Ok(RunningApp {
            name: app.name.clone(),
            child,
        })
    }

    async fn stop(&self, mut handle: RunningApp) -> Result<()> {
        let name = handle.name.clone();

        if let Some(status) = handle
            .child
            .try_wait()
            .map_err(|e| Error::app_stop_failed(&name, e))?
        {
            tracing::warn!(app = %name, %status, "app already exited");
            return Ok(());
        }

        request_terminate(&mut handle.child);

        match tokio::time::timeout(self.stop_timeout, handle.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!(app = %name, %status, "app stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(Error::app_stop_failed(&name, e)),
            Err(_) => {
                tracing::warn!(
                    app = %name,
                    timeout_secs = self.stop_timeout.as_secs(),
                    "app did not exit in time, killing"
                );
                handle
                    .child
                    .kill()
                    .await
                    .map_err(|e| Error::app_stop_failed(&name, e))
            }
        }
    }
}

/// Find the executable for an app
///
/// Anything containing a path separator is used as-is, bare names are
/// searched in PATH.
fn resolve_binary(app: &ManagedApp) -> Result<PathBuf> {
    let path = Path::new(&app.binary);
    let not_found = || Error::BinaryNotFound {
        app: app.name.clone(),
        binary: app.binary.clone(),
    };

    if path.components().count() > 1 {
        if path.exists() {
            Ok(path.to_path_buf())
        } else {
            Err(not_found())
        }
    } else {
        which::which(&app.binary).map_err(|_| not_found())
    }
}

#[cfg(unix)]
fn request_terminate(child: &mut Child) {
    if let Some(pid) = child.id() {
        // SIGTERM gives the app a chance to shut down cleanly
        let result = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
        if result != 0 {
            let _ = child.start_kill();
        }
    }
}

#[cfg(not(unix))]
fn request_terminate(child: &mut Child) {
    let _ = child.start_kill();
}

async fn forward_lines<R>(app: String, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(app = %app, stream, "{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher() -> ProcessLauncher {
        ProcessLauncher {
            stop_timeout: Duration::from_secs(2),
            forward_output: true,
        }
    }

    fn app(binary: &str, args: &[&str]) -> ManagedApp {
        ManagedApp {
            name: "test-app".to_string(),
            binary: binary.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_resolve_missing_path() {
        let err = resolve_binary(&app("./definitely/not/here", &[])).unwrap_err();
        assert!(matches!(err, Error::BinaryNotFound { .. }));
    }

    #[test]
    fn test_resolve_missing_bare_name() {
        let err = resolve_binary(&app("metrics-e2e-no-such-binary", &[])).unwrap_err();
        assert!(matches!(err, Error::BinaryNotFound { .. }));
    }

    #[tokio::test]
    async fn test_start_missing_binary_fails() {
        let result = launcher().start(&app("./definitely/not/here", &[])).await;
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_start_and_stop_long_running_process() {
        let launcher = launcher();
        let handle = launcher.start(&app("sleep", &["30"])).await.unwrap();
        assert!(handle.pid().is_some());
        launcher.stop(handle).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_already_exited_process() {
        let launcher = launcher();
        let handle = launcher.start(&app("true", &[])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        launcher.stop(handle).await.unwrap();
    }
}
