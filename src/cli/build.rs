// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments of the specification-driven commands.
//!
//! # Overrides
//!
//! ```text
//! --version V      replaces `version`
//! --description D  replaces `description`
//! --repository P   replaces `repository`
//! ```
//!
//! Overrides are applied before the specification is validated.

use clap::Args;
use std::path::PathBuf;

use crate::module::ModuleSpec;

/// Path of a module specification.
#[derive(Debug, Clone, Args)]
pub struct SpecArgs {
    /// Module specification (YAML).
    #[arg(value_name = "SPEC")]
    pub spec: PathBuf,
}

/// Arguments for the `build` command.
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub spec: SpecArgs,

    /// Builds the `lastVersion` stage set into `.last_version`.
    #[arg(long = "last-version")]
    pub last_version: bool,

    /// Overrides the module version.
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Overrides the release description.
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    /// Overrides the repository path.
    #[arg(long, value_name = "DIR")]
    pub repository: Option<PathBuf>,
}

impl BuildArgs {
    /// Applies the override flags to a loaded specification.
    #[must_use]
    pub fn apply(&self, mut module: ModuleSpec) -> ModuleSpec {
        if let Some(version) = &self.version {
            module = module.with_version(version);
        }
        if let Some(description) = &self.description {
            module = module.with_description(description);
        }
        if let Some(repository) = &self.repository {
            module = module.with_repository(repository);
        }
        module
    }
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub spec: SpecArgs,

    /// Name of the stage set under `run`.
    #[arg(value_name = "COMMAND")]
    pub command: String,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub spec: SpecArgs,

    /// Prints the report as JSON.
    #[arg(long)]
    pub json: bool,
}
