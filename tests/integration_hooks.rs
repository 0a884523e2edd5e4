// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for stage hooks using wiremock.
//!
//! Drives ad-hoc stage sets whose callbacks hit a mock server or run local
//! commands, covering:
//! - Pre/post ordering around the copy
//! - Non-200 answers aborting the stage
//! - Command hooks running in the repository

use std::path::{Path, PathBuf};
use std::time::Duration;

use modpack::cli::build::{RunArgs, SpecArgs};
use modpack::cmd::run::run_stage_set;
use modpack::config::Settings;
use modpack::error::{BuildError, HookError};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Writes a module with one `deploy` stage set and the given callbacks.
fn write_spec(repo: &Path, callbacks: &str) -> PathBuf {
    std::fs::create_dir_all(repo.join("src")).unwrap();
    std::fs::write(repo.join("src/init.php"), "<?php\n").unwrap();
    let spec = repo.join("module.yaml");
    std::fs::write(
        &spec,
        format!(
            r#"
name: acme.shop
version: 2.0.0
repository: {repo}
logDirectory: {repo}/log
stages:
  - name: deploy
    to: public
    from: ["{repo}/src"]
    actionIfFileExists: replace
run:
  deploy: [deploy]
callbacks:
{callbacks}
"#,
            repo = repo.display()
        ),
    )
    .unwrap();
    spec
}

async fn run_deploy(spec: PathBuf, target: &Path) -> modpack::error::Result<()> {
    let args = RunArgs {
        spec: SpecArgs { spec },
        command: "deploy".to_string(),
    };
    tokio::time::timeout(
        Duration::from_secs(20),
        run_stage_set(
            &args,
            &Settings::default(),
            target.to_path_buf(),
            CancellationToken::new(),
        ),
    )
    .await
    .expect("stage set did not finish")
}

#[tokio::test]
async fn hooks_wrap_the_copy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pre"))
        .and(body_string("module=acme.shop&version=2.0.0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/post"))
        .and(query_param("stage", "deploy"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let repo = temp_dir();
    let target = temp_dir();
    let spec = write_spec(
        repo.path(),
        &format!(
            r"  - stage: deploy
    pre:
      type: external
      action: {uri}/pre
      method: POST
      parameters: ['module={{name}}', 'version={{version}}']
    post:
      type: external
      action: {uri}/post
      method: GET
      parameters: ['stage=deploy']",
            uri = server.uri()
        ),
    );

    run_deploy(spec, target.path()).await.unwrap();
    assert!(target.path().join("public/init.php").is_file());

    let requests = server.received_requests().await.unwrap();
    let order: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(order, ["/pre", "/post"]);
}

#[tokio::test]
async fn hooks_non_200_aborts_the_stage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let repo = temp_dir();
    let target = temp_dir();
    let spec = write_spec(
        repo.path(),
        &format!(
            r"  - stage: deploy
    pre:
      type: external
      action: {}/maintenance
      method: GET",
            server.uri()
        ),
    );

    let err = run_deploy(spec, target.path()).await.unwrap_err();
    assert!(BuildError::matches(&err, |e| matches!(e, BuildError::Stage { stage, .. } if stage == "deploy")));
    let status = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<HookError>())
        .map(|hook| matches!(hook, HookError::HttpStatus { status: 503, .. }));
    assert_eq!(status, Some(true));
    assert!(!target.path().join("public/init.php").exists());
}

#[tokio::test]
async fn hooks_command_runs_in_repository() {
    let repo = temp_dir();
    let target = temp_dir();
    let spec = write_spec(
        repo.path(),
        r"  - stage: deploy
    post:
      type: command
      action: touch
      parameters: [deployed.marker]",
    );

    run_deploy(spec, target.path()).await.unwrap();
    assert!(repo.path().join("deployed.marker").is_file());
    assert!(!target.path().join("deployed.marker").exists());
}

#[tokio::test]
async fn hooks_unsafe_command_is_rejected_before_running() {
    let repo = temp_dir();
    let target = temp_dir();
    let spec = write_spec(
        repo.path(),
        r"  - stage: deploy
    pre:
      type: command
      action: touch
      parameters: ['a.marker; rm -rf /']",
    );

    let err = run_deploy(spec, target.path()).await.unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"unsafe command argument 'a.marker; rm -rf /'");
    assert!(!target.path().join("public").exists());
}
