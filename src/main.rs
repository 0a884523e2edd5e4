// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Settings --> Logging --> Command Dispatch
//!   Build | Run | Check | Changelog | Options | Version
//! ```

use std::process::ExitCode;

use modpack::cli::global::GlobalOptions;
use modpack::cli::{self, Command};
use modpack::cmd::build::run_build_command;
use modpack::cmd::changelog::run_changelog_command;
use modpack::cmd::check::run_check_command;
use modpack::cmd::config::run_options_command;
use modpack::cmd::run::run_run_command;
use modpack::config::{SETTINGS_FILE, Settings, SettingsLoader};
use modpack::error::BuildError;
use modpack::logging::init_logging;
use modpack::logging::{LogConfig, LogLevel};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Exit code of a build that found nothing to package.
const EXIT_NO_CHANGES: u8 = 2;
/// Exit code of an interrupted run.
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let loader = match build_settings_loader(&cli.global) {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Failed to load settings: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let loaded_files = loader.format_loaded_files();
    let settings = match loader.build() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load settings: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&settings);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &settings, &loaded_files).await
}

fn build_settings_loader(global: &GlobalOptions) -> modpack::error::Result<SettingsLoader> {
    let mut loader = Settings::builder().add_toml_file_optional(SETTINGS_FILE);
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    global.apply_overrides(loader.with_env_prefix("MODPACK"))
}

fn build_log_config(settings: &Settings) -> LogConfig {
    let console_level = settings.log.level;
    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(console_level.max(LogLevel::DEBUG))
        .maybe_with_log_file(settings.log.file.as_ref().map(|p| p.display().to_string()))
        .build()
}

async fn dispatch_command(cli: &cli::Cli, settings: &Settings, loaded_files: &[String]) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Options) => {
            run_options_command(settings, loaded_files);
            Ok(())
        }
        Some(Command::Build(args)) => run_build_command(args, settings).await,
        Some(Command::Run(args)) => run_run_command(args, settings).await,
        Some(Command::Check(args)) => run_check_command(args).await,
        Some(Command::Changelog(args)) => run_changelog_command(args).await,
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if BuildError::is_no_changes(&e) => {
            eprintln!("Nothing changed, no archive produced");
            ExitCode::from(EXIT_NO_CHANGES)
        }
        Err(e) if BuildError::matches(&e, |b| matches!(b, BuildError::Cancelled)) => {
            eprintln!("Interrupted");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}
