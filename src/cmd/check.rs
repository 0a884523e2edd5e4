// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Specification check command.

use serde::Serialize;

use crate::cli::build::CheckArgs;
use crate::cmd::load_module;
use crate::error::Result;
use crate::module::ModuleSpec;
use crate::stage::check_stages;

/// Summary of a valid specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub name: String,
    pub version: String,
    pub label: Option<&'static str>,
    pub stages: Vec<String>,
    pub release: Vec<String>,
    pub last_version: Vec<String>,
    pub run: Vec<String>,
    pub incremental: bool,
}

impl CheckReport {
    #[must_use]
    pub fn new(module: &ModuleSpec) -> Self {
        Self {
            name: module.name.clone(),
            version: module.version.clone(),
            label: module.label.map(|label| label.as_str()),
            stages: module.stages.iter().map(|s| s.name.clone()).collect(),
            release: module.builds.release.clone(),
            last_version: module.builds.last_version.clone(),
            run: module.run.keys().cloned().collect(),
            incremental: module.repository.is_some() && module.changelog.is_enabled(),
        }
    }

    /// Human readable report lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let list = |items: &[String]| {
            if items.is_empty() {
                "-".to_string()
            } else {
                items.join(", ")
            }
        };
        vec![
            format!("module       {} {}", self.name, self.version),
            format!("label        {}", self.label.unwrap_or("-")),
            format!("stages       {}", list(&self.stages)),
            format!("release      {}", list(&self.release)),
            format!("last version {}", list(&self.last_version)),
            format!("run          {}", list(&self.run)),
            format!(
                "incremental  {}",
                if self.incremental { "yes" } else { "no" }
            ),
        ]
    }
}

/// Validates the specification and checks that every stage source exists.
///
/// # Errors
///
/// Returns the validation error, or `BuildError::StageCheck` listing every
/// missing source.
pub async fn check_module(args: &CheckArgs) -> Result<CheckReport> {
    let module = load_module(&args.spec.spec, |module| module)?;
    check_stages(&module).await?;
    Ok(CheckReport::new(&module))
}

/// Main handler for check command.
///
/// # Errors
///
/// Returns an error if the check fails or the report cannot be serialized.
pub async fn run_check_command(args: &CheckArgs) -> Result<()> {
    let report = check_module(args).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in report.lines() {
            println!("{line}");
        }
    }
    Ok(())
}
