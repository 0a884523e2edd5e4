// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release notes preview.

use crate::builder::description_text;
use crate::cli::build::SpecArgs;
use crate::cmd::load_module;
use crate::error::Result;
use crate::git::backend::GixBackend;

/// Prints the description a release build would write.
///
/// # Errors
///
/// Returns an error if the specification is invalid or the commit log
/// cannot be read.
pub async fn run_changelog_command(args: &SpecArgs) -> Result<()> {
    let module = load_module(&args.spec, |module| module)?;
    let text = tokio::task::spawn_blocking(move || description_text(&module, &GixBackend)).await??;
    match text {
        Some(text) => println!("{text}"),
        None => tracing::warn!("No description and no commits in the changelog range"),
    }
    Ok(())
}
