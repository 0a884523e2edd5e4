// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Async process spawning and management.
//!
//! ```text
//! ProcessBuilder::which("php")
//!   .args() .cwd() .timeout()
//!   .run_with_cancellation(token)
//!       --> tokio::process::Command
//!           stream stdout/stderr to tracing
//!           deadline / cancel --> kill the process group
//!       --> ProcessOutput { exit_code, interrupted, timed_out }
//! ```

pub mod builder;
mod io;
mod runner;
#[cfg(test)]
mod tests;
