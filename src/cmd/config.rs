// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Settings-related commands for modpack.

use crate::config::Settings;

/// Display current settings and the files they were loaded from.
pub fn run_options_command(settings: &Settings, config_files: &[String]) {
    for line in settings.format_options() {
        println!("{line}");
    }
    if config_files.is_empty() {
        println!("\nNo settings files loaded");
    } else {
        println!();
        for line in config_files {
            println!("{line}");
        }
    }
}
