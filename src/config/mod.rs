// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tool settings.
//!
//! # Settings Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. modpack.toml (cwd, optional)
//! 3. --config files
//! 4. MODPACK_* env vars
//! 5. CLI overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! MODPACK_LOG__LEVEL=4                  → log.level = 4
//! MODPACK_BUILD__QUEUE_CAPACITY=512     → build.queue_capacity = 512
//! MODPACK_BUILD__HOOK_TIMEOUT_SECS=10   → build.hook_timeout_secs = 10
//! ```
//!
//! Module specifications are separate YAML documents, see
//! [`crate::module::ModuleSpec`].

pub mod loader;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::logging::LogLevel;

pub use loader::SettingsLoader;

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "modpack.toml";

/// Logging options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// Console log level (0-6).
    pub level: LogLevel,
    /// Optional tool log file.
    pub file: Option<PathBuf>,
}

/// Staging engine options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSettings {
    /// Deadline of a single pre- or post-stage hook.
    pub hook_timeout_secs: u64,
    /// Capacity of the file copy queue.
    pub queue_capacity: usize,
    /// Upper bound for copy workers; unbounded when unset.
    pub max_workers: Option<usize>,
    /// Used when a module has no `buildDirectory`.
    pub default_build_directory: PathBuf,
    /// Used when a module has no `logDirectory`.
    pub default_log_directory: PathBuf,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            hook_timeout_secs: 30,
            queue_capacity: 256,
            max_workers: None,
            default_build_directory: PathBuf::from("build"),
            default_log_directory: PathBuf::from("log"),
        }
    }
}

impl BuildSettings {
    #[must_use]
    pub const fn hook_timeout(&self) -> Duration {
        Duration::from_secs(self.hook_timeout_secs)
    }

    /// Number of copy workers for `sources` source paths.
    ///
    /// At least twice the available parallelism, or one worker per source
    /// when there are more sources, capped by `max_workers`.
    #[must_use]
    pub fn worker_count(&self, sources: usize) -> usize {
        let cpus = std::thread::available_parallelism().map_or(1, std::num::NonZero::get);
        let workers = (cpus * 2).max(sources);
        self.max_workers
            .map_or(workers, |max| workers.min(max))
            .max(1)
    }
}

/// Complete tool settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub log: LogSettings,
    pub build: BuildSettings,
}

impl Settings {
    /// Create a new settings loader.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use modpack::config::Settings;
    ///
    /// let settings = Settings::builder()
    ///     .add_toml_file_optional("modpack.toml")
    ///     .with_env_prefix("MODPACK")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> SettingsLoader {
        SettingsLoader::new()
    }

    /// Load settings from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Settings` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Settings` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Validates value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if the hook timeout, queue capacity or worker cap is zero.
    pub fn validate(&self) -> Result<()> {
        if self.build.hook_timeout_secs == 0 {
            anyhow::bail!("build.hook_timeout_secs must be greater than 0");
        }
        if self.build.queue_capacity == 0 {
            anyhow::bail!("build.queue_capacity must be greater than 0");
        }
        if self.build.max_workers == Some(0) {
            anyhow::bail!("build.max_workers must be greater than 0");
        }
        Ok(())
    }

    /// Format settings for display, ordered by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        options.insert("log.level", self.log.level.as_u8().to_string());
        options.insert(
            "log.file",
            self.log
                .file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
        options.insert(
            "build.hook_timeout_secs",
            self.build.hook_timeout_secs.to_string(),
        );
        options.insert("build.queue_capacity", self.build.queue_capacity.to_string());
        options.insert(
            "build.max_workers",
            self.build
                .max_workers
                .map_or_else(String::new, |n| n.to_string()),
        );
        options.insert(
            "build.default_build_directory",
            self.build.default_build_directory.display().to_string(),
        );
        options.insert(
            "build.default_log_directory",
            self.build.default_log_directory.display().to_string(),
        );

        let max_key_len = options.keys().map(|k| k.len()).max().unwrap_or(0);
        options
            .into_iter()
            .map(|(key, value)| {
                format!("{key:<max_key_len$} = {value}")
                    .trim_end()
                    .to_string()
            })
            .collect()
    }
}
