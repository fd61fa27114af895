//! Subprocess-based method discovery
//!
//! This module provides [`SubprocessDiscovery`], which runs the discovery
//! helper as a child process in the project directory and reads its single
//! reply from stdout.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::discovery::{HelperCommand, MethodDiscovery};
use crate::error::AclGenError;

/// Time the helper gets to exit on its own after replying
const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Discovery through a short-lived helper process
///
/// # Process Lifecycle
///
/// 1. **Spawn** - `program args... <model>` in the project root, stdout/stderr piped
/// 2. **Reply** - the first stdout line that parses as a JSON array of strings
/// 3. **Teardown** - in a background task: wait for exit, then SIGTERM, then SIGKILL
///
/// Lines that are not a JSON string array (boot logs) are skipped. If the
/// request future is dropped, `kill_on_drop` reaps the helper.
///
/// # Example
///
/// ```
/// use acl_gen::discovery::{HelperCommand, SubprocessDiscovery};
/// use std::path::PathBuf;
///
/// let discovery = SubprocessDiscovery::new(
///     HelperCommand {
///         program: PathBuf::from("node"),
///         args: vec!["scripts/list-methods.js".to_string()],
///     },
///     "/srv/app",
/// );
/// ```
pub struct SubprocessDiscovery {
    /// Helper program and leading arguments
    command: HelperCommand,

    /// Working directory of the helper (the project root)
    cwd: PathBuf,

    /// Grace period before the helper is signalled after replying
    grace_period: Duration,
}

impl SubprocessDiscovery {
    /// Create a discovery running `command` inside `cwd`
    pub fn new(command: HelperCommand, cwd: impl Into<PathBuf>) -> Self {
        Self {
            command,
            cwd: cwd.into(),
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    /// Override the teardown grace period
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Read stdout until the helper replies or closes the stream
    async fn read_reply(stdout: ChildStdout) -> Result<Option<Vec<String>>, AclGenError> {
        let mut lines = BufReader::new(stdout).lines();

        while let Some(line) = lines.next_line().await? {
            trace!("Helper stdout: {}", line);

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<Vec<String>>(&line) {
                Ok(methods) => return Ok(Some(methods)),
                Err(e) => trace!("Skipping non-reply line: {}", e),
            }
        }

        Ok(None)
    }

    /// Collect stderr for diagnostics
    fn spawn_stderr_task(stderr: tokio::process::ChildStderr) -> JoinHandle<String> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut buffer = String::new();

            while let Ok(Some(line)) = lines.next_line().await {
                debug!("Helper stderr: {}", line);
                buffer.push_str(&line);
                buffer.push('\n');
            }

            buffer
        })
    }

    /// Shut the helper down without holding up the caller
    fn spawn_teardown(mut child: Child, grace_period: Duration) {
        tokio::spawn(async move {
            match timeout(grace_period, child.wait()).await {
                Ok(Ok(status)) => debug!("Helper exited with status: {:?}", status),
                Ok(Err(e)) => warn!("Error waiting for helper: {}", e),
                Err(_) => {
                    debug!("Helper still running after reply, terminating");
                    Self::force_shutdown(child, grace_period).await;
                }
            }
        });
    }

    /// Force shutdown: SIGTERM → wait → SIGKILL
    async fn force_shutdown(mut child: Child, grace_period: Duration) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = child.id() {
                debug!("Sending SIGTERM to pid {}", pid);
                let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);

                match timeout(grace_period, child.wait()).await {
                    Ok(Ok(status)) => {
                        debug!("Helper exited after SIGTERM: {:?}", status);
                        return;
                    }
                    Ok(Err(e)) => warn!("Error waiting after SIGTERM: {}", e),
                    Err(_) => warn!("SIGTERM timed out, sending SIGKILL"),
                }

                debug!("Sending SIGKILL to pid {}", pid);
                let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
                let _ = child.wait().await;
            }
        }

        #[cfg(not(unix))]
        {
            debug!("Force killing helper (non-Unix platform)");
            let _ = child.kill().await;
        }
    }
}

#[async_trait]
impl MethodDiscovery for SubprocessDiscovery {
    async fn discover(&self, model: &str) -> Result<Vec<String>, AclGenError> {
        debug!(
            "Spawning discovery helper: {} {:?} {}",
            self.command.program.display(),
            self.command.args,
            model
        );

        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(model)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AclGenError::HelperNotFound
                } else {
                    AclGenError::Io(e)
                }
            })?;

        debug!("Helper spawned with pid: {:?}", child.id());

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AclGenError::Discovery("failed to capture stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AclGenError::Discovery("failed to capture stderr".to_string()))?;
        let stderr_task = Self::spawn_stderr_task(stderr);

        match Self::read_reply(stdout).await {
            Ok(Some(methods)) => {
                Self::spawn_teardown(child, self.grace_period);
                Ok(methods)
            }
            Ok(None) => {
                let status = child.wait().await?;
                let stderr = stderr_task.await.unwrap_or_default();
                if status.success() {
                    Err(AclGenError::Discovery(
                        "helper exited without replying".to_string(),
                    ))
                } else {
                    Err(AclGenError::Process {
                        code: status.code().unwrap_or(-1),
                        stderr,
                    })
                }
            }
            Err(e) => {
                Self::spawn_teardown(child, self.grace_period);
                Err(e)
            }
        }
    }
}
