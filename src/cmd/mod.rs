// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   build, run, check, changelog, config
//! ```

pub mod build;
pub mod changelog;
pub mod check;
pub mod config;
pub mod run;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::BuildSettings;
use crate::error::Result;
use crate::git::backend::GixBackend;
use crate::logging::{BuildLogger, FileBuildLogger};
use crate::module::ModuleSpec;
use crate::stage::StageContext;

/// Loads a specification, lets `adjust` apply overrides, then validates it.
pub(crate) fn load_module(
    path: &Path,
    adjust: impl FnOnce(ModuleSpec) -> ModuleSpec,
) -> Result<ModuleSpec> {
    let module = adjust(ModuleSpec::load(path)?);
    module.validate()?;
    Ok(module)
}

/// Returns a token cancelled on Ctrl+C.
pub(crate) fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl+C, interrupting stages...");
            cancel.cancel();
        }
    });
    token
}

/// Builds the stage context of a command: module log file, gix history and
/// the loaded settings.
pub(crate) fn stage_context(
    module: &ModuleSpec,
    settings: &BuildSettings,
    cancel_token: CancellationToken,
) -> Result<StageContext> {
    let directory = module
        .log_directory
        .as_deref()
        .unwrap_or(&settings.default_log_directory);
    let logger: Arc<dyn BuildLogger> =
        Arc::new(FileBuildLogger::new(directory, &module.name, &module.log)?);
    Ok(StageContext::new(
        cancel_token,
        logger,
        Arc::new(GixBackend),
        settings.clone(),
    ))
}
