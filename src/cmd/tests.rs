// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use super::build::build_module;
use super::check::{CheckReport, check_module};
use super::load_module;
use super::run::run_stage_set;
use crate::cli::build::{BuildArgs, CheckArgs, RunArgs, SpecArgs};
use crate::config::Settings;
use crate::error::{BuildError, SpecError};
use crate::test_utils::temp_dir;

fn write_spec(root: &Path) -> PathBuf {
    let yaml = format!(
        r#"
name: acme.shop
version: 1.0.0
label: beta
buildDirectory: {root}/build
logDirectory: {root}/log
stages:
  - name: components
    to: install/components
    from: ["{root}/src/components"]
    actionIfFileExists: replace
builds:
  release: [components]
  lastVersion: [components]
run:
  sync: [components]
"#,
        root = root.display()
    );
    let components = root.join("src/components");
    std::fs::create_dir_all(&components).unwrap();
    std::fs::write(components.join("a.php"), "<?php\n").unwrap();
    let path = root.join("module.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

fn spec_args(path: PathBuf) -> SpecArgs {
    SpecArgs { spec: path }
}

#[test]
fn test_load_module_applies_overrides_before_validation() {
    let root = temp_dir();
    let path = write_spec(root.path());

    let module = load_module(&path, |m| m.with_version("2.0.0")).unwrap();
    assert_eq!(module.version, "2.0.0");

    let err = load_module(&path, |m| m.with_version(" ")).unwrap_err();
    assert!(err.downcast_ref::<SpecError>().is_some());
}

#[tokio::test]
async fn test_check_module_report() {
    let root = temp_dir();
    let path = write_spec(root.path());

    let report = check_module(&CheckArgs {
        spec: spec_args(path),
        json: false,
    })
    .await
    .unwrap();
    insta::assert_snapshot!(report.lines().join("\n"), @r"
    module       acme.shop 1.0.0
    label        beta
    stages       components
    release      components
    last version components
    run          sync
    incremental  no
    ");
}

#[test]
fn test_check_report_json() {
    let module = crate::module::ModuleSpec::from_yaml("name: a\nversion: '1'\n").unwrap();
    let json = serde_json::to_value(CheckReport::new(&module)).unwrap();
    assert_eq!(json["name"], "a");
    assert!(json["label"].is_null());
    assert_eq!(json["incremental"], false);
}

#[tokio::test]
async fn test_check_module_missing_source() {
    let root = temp_dir();
    let path = write_spec(root.path());
    std::fs::remove_dir_all(root.path().join("src/components")).unwrap();

    let err = check_module(&CheckArgs {
        spec: spec_args(path),
        json: true,
    })
    .await
    .unwrap_err();
    assert!(BuildError::matches(&err, |e| matches!(e, BuildError::StageCheck { .. })));
}

#[tokio::test]
async fn test_build_module_writes_archive() {
    let root = temp_dir();
    let path = write_spec(root.path());
    let args = BuildArgs {
        spec: spec_args(path),
        last_version: false,
        version: Some("1.1.0".to_string()),
        description: Some("Fixes".to_string()),
        repository: None,
    };

    let archive = build_module(&args, &Settings::default(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(archive, root.path().join("build/1.1.0.zip"));
    assert!(archive.is_file());
    assert!(!root.path().join("build/1.1.0").exists());
    assert!(root.path().join("log").is_dir());
}

#[tokio::test]
async fn test_run_stage_set_copies_below_root() {
    let root = temp_dir();
    let path = write_spec(root.path());
    let target = temp_dir();
    let args = RunArgs {
        spec: spec_args(path),
        command: "sync".to_string(),
    };

    run_stage_set(
        &args,
        &Settings::default(),
        target.path().to_path_buf(),
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert!(target.path().join("install/components/a.php").is_file());
}

#[tokio::test]
async fn test_run_stage_set_unknown_command() {
    let root = temp_dir();
    let path = write_spec(root.path());
    let args = RunArgs {
        spec: spec_args(path),
        command: "deploy".to_string(),
    };

    let err = run_stage_set(
        &args,
        &Settings::default(),
        root.path().to_path_buf(),
        CancellationToken::new(),
    )
    .await
    .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"stage 'deploy' referenced in 'run' is not defined"
    );
}
