// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Build command implementation for modpack.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::builder::ModuleBuilder;
use crate::cli::build::BuildArgs;
use crate::cmd::{interrupt_token, load_module, stage_context};
use crate::config::Settings;
use crate::error::Result;

/// Main handler for build command.
///
/// # Errors
///
/// Returns an error if the specification is invalid or the build fails.
pub async fn run_build_command(args: &BuildArgs, settings: &Settings) -> Result<()> {
    let archive = build_module(args, settings, interrupt_token()).await?;
    println!("{}", archive.display());
    Ok(())
}

/// Builds the module described by `args` and returns the archive path.
///
/// The version directory is removed afterwards whether or not the build
/// succeeded.
///
/// # Errors
///
/// Returns an error if the specification is invalid or the build fails.
pub async fn build_module(
    args: &BuildArgs,
    settings: &Settings,
    cancel_token: CancellationToken,
) -> Result<PathBuf> {
    let module = load_module(&args.spec.spec, |module| args.apply(module))?;
    let ctx = stage_context(&module, &settings.build, cancel_token)?;
    let mut builder = ModuleBuilder::new(module, ctx).with_last_version(args.last_version);
    tracing::info!(
        module = %builder.module().name,
        version = %builder.module().version,
        last_version = builder.is_last_version(),
        "Building module"
    );

    let result = builder.build().await;
    builder.cleanup().await;

    if let Ok(archive) = &result {
        tracing::info!(archive = %archive.display(), "Build completed successfully");
    }
    result
}
