// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{BuildSettings, Settings, SettingsLoader};
use crate::logging::LogLevel;
use crate::test_utils::temp_dir;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    insta::assert_snapshot!(settings.format_options().join("\n"), @r"
    build.default_build_directory = build
    build.default_log_directory   = log
    build.hook_timeout_secs       = 30
    build.max_workers             =
    build.queue_capacity          = 256
    log.file                      =
    log.level                     = 3
    ");
    assert_eq!(settings.build.hook_timeout(), Duration::from_secs(30));
}

#[test]
fn test_parse_settings() {
    let settings = Settings::parse(
        r#"
[log]
level = 4
file = "logs/modpack.log"

[build]
hook_timeout_secs = 5
max_workers = 3
default_build_directory = "out"
"#,
    )
    .unwrap();

    assert_eq!(settings.log.level, LogLevel::DEBUG);
    assert_eq!(settings.log.file, Some(PathBuf::from("logs/modpack.log")));
    assert_eq!(settings.build.hook_timeout(), Duration::from_secs(5));
    assert_eq!(settings.build.max_workers, Some(3));
    assert_eq!(settings.build.queue_capacity, 256);
    assert_eq!(settings.build.default_build_directory, PathBuf::from("out"));
}

#[test]
fn test_unknown_keys_rejected() {
    assert!(Settings::parse("[build]\nworkers = 3\n").is_err());
    assert!(Settings::parse("[paths]\nprefix = \"x\"\n").is_err());
}

#[test]
fn test_validation_rejects_zero_values() {
    for content in [
        "[build]\nhook_timeout_secs = 0\n",
        "[build]\nqueue_capacity = 0\n",
        "[build]\nmax_workers = 0\n",
        "[log]\nlevel = 9\n",
    ] {
        assert!(Settings::parse(content).is_err(), "{content}");
    }
}

#[test]
fn test_worker_count() {
    let cpus = std::thread::available_parallelism().map_or(1, std::num::NonZero::get);
    let build = BuildSettings::default();
    assert_eq!(build.worker_count(0), cpus * 2);
    assert_eq!(build.worker_count(cpus * 2 + 5), cpus * 2 + 5);

    let capped = BuildSettings {
        max_workers: Some(1),
        ..BuildSettings::default()
    };
    assert_eq!(capped.worker_count(100), 1);
}

#[test]
fn test_loader_layered_sources() {
    let dir = temp_dir();
    let base = dir.path().join("modpack.toml");
    let extra = dir.path().join("ci.toml");
    std::fs::write(&base, "[build]\nqueue_capacity = 64\nhook_timeout_secs = 10\n").unwrap();
    std::fs::write(&extra, "[build]\nhook_timeout_secs = 20\n").unwrap();

    let loader = SettingsLoader::new()
        .add_toml_file_optional(&base)
        .add_toml_file_optional(dir.path().join("missing.toml"))
        .add_toml_file(&extra);
    assert_eq!(loader.format_loaded_files().len(), 2);

    let settings = loader.set("log.level", 5).unwrap().build().unwrap();
    assert_eq!(settings.build.queue_capacity, 64);
    assert_eq!(settings.build.hook_timeout_secs, 20);
    assert_eq!(settings.log.level, LogLevel::TRACE);
}

#[test]
fn test_loader_missing_required_file() {
    let dir = temp_dir();
    let result = SettingsLoader::new()
        .add_toml_file(dir.path().join("missing.toml"))
        .build();
    assert!(result.is_err());
}

#[test]
fn test_loader_env_prefix() {
    // SAFETY: the variable name is unique to this test.
    unsafe {
        std::env::set_var("MODPACKTEST_BUILD__QUEUE_CAPACITY", "512");
    }

    let settings = SettingsLoader::new()
        .add_toml_str("[build]\nqueue_capacity = 8\n")
        .with_env_prefix("MODPACKTEST")
        .build();

    // SAFETY: see above.
    unsafe {
        std::env::remove_var("MODPACKTEST_BUILD__QUEUE_CAPACITY");
    }
    assert_eq!(settings.unwrap().build.queue_capacity, 512);
}
