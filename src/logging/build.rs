// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-build loggers.

use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation as AppenderRotation};

use crate::error::Result;
use crate::module::{LogPolicy, Rotation};

/// Sink for build progress messages.
///
/// Shared between stage tasks, so implementations must be thread-safe.
pub trait BuildLogger: Send + Sync {
    fn info(&self, message: &str);

    fn error(&self, message: &str, err: &anyhow::Error);

    /// Flushes and releases any held resources. Later calls are no-ops.
    fn cleanup(&self);
}

/// Forwards build messages to the global `tracing` subscriber.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    module: String,
}

impl TracingLogger {
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }
}

impl BuildLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(module = %self.module, "{message}");
    }

    fn error(&self, message: &str, err: &anyhow::Error) {
        tracing::error!(module = %self.module, error = format!("{err:#}"), "{message}");
    }

    fn cleanup(&self) {}
}

struct FileSink {
    writer: NonBlocking,
    _guard: WorkerGuard,
}

/// Writes build messages to a rolling file in the module's log directory
/// and forwards them to `tracing`.
///
/// Files are named `{module}.log`, with the period inserted before the
/// suffix when the policy rotates.
pub struct FileBuildLogger {
    tracing: TracingLogger,
    sink: Mutex<Option<FileSink>>,
}

const fn appender_rotation(rotation: Rotation) -> AppenderRotation {
    match rotation {
        Rotation::Never => AppenderRotation::NEVER,
        Rotation::Minutely => AppenderRotation::MINUTELY,
        Rotation::Hourly => AppenderRotation::HOURLY,
        Rotation::Daily => AppenderRotation::DAILY,
    }
}

impl FileBuildLogger {
    /// Opens the module log in `directory`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the log file cannot be created.
    pub fn new(directory: &Path, module: &str, policy: &LogPolicy) -> Result<Self> {
        std::fs::create_dir_all(directory)
            .with_context(|| format!("failed to create log directory {}", directory.display()))?;

        let mut builder = RollingFileAppender::builder()
            .rotation(appender_rotation(policy.rotation))
            .filename_prefix(module)
            .filename_suffix("log");
        if let Some(max_files) = policy.max_files {
            builder = builder.max_log_files(max_files);
        }
        let appender = builder
            .build(directory)
            .with_context(|| format!("failed to open module log in {}", directory.display()))?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        Ok(Self {
            tracing: TracingLogger::new(module),
            sink: Mutex::new(Some(FileSink {
                writer,
                _guard: guard,
            })),
        })
    }

    fn write_line(&self, level: &str, line: &str) {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(sink) = sink.as_mut() {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            if let Err(err) = writeln!(sink.writer, "{timestamp} {level:<5} {line}") {
                tracing::warn!(error = %err, "failed to write module log");
            }
        }
    }
}

impl BuildLogger for FileBuildLogger {
    fn info(&self, message: &str) {
        self.tracing.info(message);
        self.write_line("INFO", message);
    }

    fn error(&self, message: &str, err: &anyhow::Error) {
        self.tracing.error(message, err);
        self.write_line("ERROR", &format!("{message}: {err:#}"));
    }

    fn cleanup(&self) {
        // Dropping the guard flushes the background writer.
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl std::fmt::Debug for FileBuildLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBuildLogger")
            .field("module", &self.tracing.module)
            .finish_non_exhaustive()
    }
}
