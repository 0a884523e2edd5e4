// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Process execution and lifecycle management.
//!
//! ```text
//! run_with_cancellation(token)
//!              |
//!              v
//!     build_command()
//!     args, cwd, stdio
//!              |
//!              v
//!          spawn() ----------> HookError::Spawn
//!              |
//!              v
//!   run_child: wait | deadline | cancel
//!              |
//!              v
//!    validate exit_code ------> HookError::NonZeroExit
//!    (skip if killed)
//!              |
//!              v
//!       ProcessOutput
//! ```

use crate::error::{HookError, Result};
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use super::builder::{ProcessBuilder, ProcessOutput};

impl ProcessBuilder {
    /// Returns the display name for this process.
    pub(super) fn display_name(&self) -> String {
        self.name_override().map_or_else(
            || {
                self.program().file_stem().map_or_else(
                    || "process".to_string(),
                    |s| s.to_string_lossy().into_owned(),
                )
            },
            String::from,
        )
    }

    /// Returns the full command line as a string (for logging).
    #[must_use]
    pub fn command_line(&self) -> String {
        use std::fmt::Write as _;

        let mut cmd = format!("{}", self.program().display());
        for arg in self.args_slice() {
            if arg.contains(' ') {
                let _ = write!(cmd, " \"{arg}\"");
            } else {
                let _ = write!(cmd, " {arg}");
            }
        }
        cmd
    }

    /// Spawns and runs the process until it exits, its deadline passes or
    /// `token` is cancelled.
    ///
    /// A process stopped by its deadline or by cancellation is killed and
    /// reported through [`ProcessOutput::is_timed_out`] or
    /// [`ProcessOutput::is_interrupted`] rather than as an error.
    ///
    /// # Errors
    ///
    /// Returns a `HookError` if:
    /// - Spawning the child process fails.
    /// - Killing the process after its deadline fails.
    /// - The process exits with a non-zero status.
    pub async fn run_with_cancellation(self, token: CancellationToken) -> Result<ProcessOutput> {
        let name = self.display_name();
        let cmd_line = self.command_line();

        if token.is_cancelled() {
            return Ok(ProcessOutput::interrupted());
        }

        if let Some(cwd) = self.working_dir() {
            debug!(cwd = %cwd.display(), "cd");
        }
        debug!(cmd = %cmd_line, "exec");

        let mut child = self
            .build_command()
            .spawn()
            .map_err(|source| HookError::Spawn {
                command: cmd_line.clone(),
                source,
            })?;
        trace!(process = %name, pid = ?child.id(), "spawned");

        let output = self.run_child(&name, &cmd_line, &mut child, token).await?;

        if !output.is_interrupted() && !output.is_timed_out() && output.exit_code() != 0 {
            error!(process = %name, code = output.exit_code(), "process failed");
            return Err(HookError::NonZeroExit {
                command: cmd_line,
                code: output.exit_code(),
            }
            .into());
        }

        trace!(
            process = %name,
            exit_code = output.exit_code(),
            interrupted = output.is_interrupted(),
            timed_out = output.is_timed_out(),
            "completed"
        );
        Ok(output)
    }

    /// Builds the tokio Command from this builder's configuration.
    fn build_command(&self) -> Command {
        let mut command = Command::new(self.program());
        command.args(self.args_slice());

        if let Some(cwd) = self.working_dir() {
            command.current_dir(cwd);
        }

        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        // Own group, so a deadline or cancel can kill the whole tree.
        #[cfg(unix)]
        command.process_group(0);
        command.kill_on_drop(true);
        command
    }
}
