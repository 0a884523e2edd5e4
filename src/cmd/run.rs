// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ad-hoc stage set execution.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::cli::build::RunArgs;
use crate::cmd::{interrupt_token, load_module, stage_context};
use crate::config::Settings;
use crate::error::{Result, SpecError};
use crate::stage::{StageMode, handle_stages};

/// Runs the `run.<command>` stage set with the current directory as root.
///
/// # Errors
///
/// Returns an error if the specification is invalid, the stage set does not
/// exist, or a stage fails.
pub async fn run_run_command(args: &RunArgs, settings: &Settings) -> Result<()> {
    let root = std::env::current_dir().context("failed to read the working directory")?;
    run_stage_set(args, settings, root, interrupt_token()).await
}

/// Runs the `run.<command>` stage set with destinations below `root`.
///
/// # Errors
///
/// Returns an error if the specification is invalid, the stage set does not
/// exist, or a stage fails.
pub async fn run_stage_set(
    args: &RunArgs,
    settings: &Settings,
    root: PathBuf,
    cancel_token: CancellationToken,
) -> Result<()> {
    let module = load_module(&args.spec.spec, |module| module)?;
    let stages = module
        .run
        .get(&args.command)
        .cloned()
        .ok_or_else(|| SpecError::UnknownStage {
            list: "run".to_string(),
            stage: args.command.clone(),
        })?;

    let ctx = stage_context(&module, &settings.build, cancel_token)?;
    tracing::info!(module = %module.name, command = %args.command, ?stages, "Running stage set");

    let result = handle_stages(&ctx, &stages, &Arc::new(module), StageMode::AdHoc { root }).await;
    ctx.logger().cleanup();
    result
}
