// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! I/O streaming and process tree termination.
//!
//! ```text
//! run_child()
//!   stdout/stderr reader tasks --> tracing (debug)
//!   wait | deadline | cancel
//!            |         |
//!            +--> kill_tree (whole process group)
//!   readers joined within READER_GRACE, aborted after
//!   --> ProcessOutput { exit_code, interrupted, timed_out }
//! ```

use crate::error::{HookError, Result};
use anyhow::Context;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::builder::{ProcessBuilder, ProcessOutput};

/// How long reader tasks may drain the pipes once the process is gone.
///
/// A descendant that left the process group can keep the pipes open forever.
const READER_GRACE: Duration = Duration::from_secs(2);

/// Spawns a reader task forwarding lines to the log.
fn spawn_reader<R>(
    reader: Option<R>,
    process_name: &str,
    stream_name: &'static str,
) -> Option<JoinHandle<()>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    reader.map(|reader| {
        let name = process_name.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(process = %name, stream = stream_name, line = %line, "output");
            }
        })
    })
}

/// Waits for reader tasks, aborting those still running after `grace`.
async fn await_readers(handles: [Option<JoinHandle<()>>; 2], grace: Duration) {
    for mut handle in handles.into_iter().flatten() {
        if tokio::time::timeout(grace, &mut handle).await.is_err() {
            debug!("output reader still open, aborted");
            handle.abort();
        }
    }
}

async fn deadline(timeout: Option<Duration>) {
    match timeout {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}

/// Kills the process group led by `child`, then the child itself.
///
/// The child is spawned as a group leader, so its pid is the group id.
#[cfg(unix)]
async fn kill_tree(child: &mut Child) -> std::io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if let Some(pid) = child.id() {
        let group = Pid::from_raw(i32::try_from(pid).map_err(std::io::Error::other)?);
        match killpg(group, Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(errno) => return Err(errno.into()),
        }
    }
    child.kill().await
}

#[cfg(not(unix))]
async fn kill_tree(child: &mut Child) -> std::io::Result<()> {
    child.kill().await
}

enum Stop {
    Exited(std::process::ExitStatus),
    TimedOut,
    Cancelled,
}

impl ProcessBuilder {
    /// Runs the child process, handling I/O streaming, deadline and cancellation.
    pub(super) async fn run_child(
        &self,
        name: &str,
        cmd_line: &str,
        child: &mut Child,
        token: CancellationToken,
    ) -> Result<ProcessOutput> {
        let readers = [
            spawn_reader(child.stdout.take(), name, "stdout"),
            spawn_reader(child.stderr.take(), name, "stderr"),
        ];

        let stop = tokio::select! {
            status = child.wait() => Stop::Exited(
                status.with_context(|| format!("failed waiting for process {name}"))?,
            ),
            () = deadline(self.timeout_duration()) => Stop::TimedOut,
            () = token.cancelled() => Stop::Cancelled,
        };

        let status = match stop {
            Stop::Exited(status) => status,
            Stop::TimedOut | Stop::Cancelled => {
                kill_tree(child).await.map_err(|source| HookError::Kill {
                    command: cmd_line.to_string(),
                    source,
                })?;
                child
                    .wait()
                    .await
                    .with_context(|| format!("failed waiting for process {name} to exit"))?
            }
        };

        await_readers(readers, READER_GRACE).await;

        let output = ProcessOutput::new(status.code().unwrap_or(-1));
        Ok(match stop {
            Stop::Exited(_) => output,
            Stop::TimedOut => {
                warn!(process = %name, timeout = ?self.timeout_duration(), "process timed out, killed");
                output.mark_timed_out()
            }
            Stop::Cancelled => {
                warn!(process = %name, "cancellation requested, process killed");
                output.mark_interrupted()
            }
        })
    }
}
