// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for modpack using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! modpack [global options] <command>
//! build <spec> [--last-version] [--version V] [--description D] [--repository P]
//! run <spec> <command>
//! check <spec> [--json]
//! changelog <spec>
//! options
//! version
//! ```

pub mod build;
pub mod global;


use crate::cli::build::{BuildArgs, CheckArgs, RunArgs, SpecArgs};
use crate::cli::global::GlobalOptions;
use clap::{Parser, Subcommand};

/// Module Packaging Tool
///
/// Stages, filters and archives module releases.
#[derive(Debug, Parser)]
#[command(
    name = "modpack",
    author,
    version,
    about = "Module Packaging Tool",
    long_about = "modpack Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Copies the sources of a module into a versioned build directory\n\
                  stage by stage, runs the configured hooks and packs the result\n\
                  into a zip archive. See `modpack <command> --help` for more\n\
                  information about a command.",
    after_help = "SETTINGS:\n\n\
                  Tool settings are read from `modpack.toml` in the current\n\
                  directory when present, then from every --config file in order,\n\
                  then from MODPACK_* environment variables such as\n\
                  MODPACK_BUILD__QUEUE_CAPACITY=512. Module specifications are\n\
                  separate YAML documents passed to each command."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all settings and their values.
    Options,

    /// Builds a release or the last version archive.
    Build(BuildArgs),

    /// Runs an ad-hoc stage set in the current directory.
    Run(RunArgs),

    /// Validates a specification and checks its stage sources.
    Check(CheckArgs),

    /// Prints the release notes of the changelog range.
    Changelog(SpecArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
