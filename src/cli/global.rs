// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Global CLI options available for all commands.
//!
//! # Option Precedence
//!
//! ```text
//! --config FILE     ← Additional settings files (can repeat)
//! --log-level N     ← Console verbosity (0-6)
//! --log-file FILE   ← Tool log file
//!
//! Precedence: CLI flags > MODPACK_* env > --config > modpack.toml > defaults
//! ```

use clap::Args;
use std::path::PathBuf;

use crate::config::SettingsLoader;
use crate::error::Result;

/// Global options available for all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Path to additional TOML settings file(s).
    /// Can be specified multiple times.
    #[arg(short = 'c', long = "config", value_name = "FILE", action = clap::ArgAction::Append)]
    pub configs: Vec<PathBuf>,

    /// Console log level (0=silent, 1=errors, 2=warnings, 3=info, 4=debug, 5=trace, 6=dump).
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub log_level: Option<u8>,

    /// Path to the tool log file.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl GlobalOptions {
    /// Applies the command-line flags as the highest priority settings.
    ///
    /// # Errors
    ///
    /// Returns an error if an override cannot be recorded.
    pub fn apply_overrides(&self, mut loader: SettingsLoader) -> Result<SettingsLoader> {
        if let Some(level) = self.log_level {
            loader = loader.set("log.level", i64::from(level))?;
        }
        if let Some(path) = &self.log_file {
            loader = loader.set("log.file", path.display().to_string())?;
        }
        Ok(loader)
    }
}
