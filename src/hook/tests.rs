// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::*;
use crate::error::{BuildError, HookError};
use crate::test_utils::{capture_logs, temp_dir};
use std::time::Instant;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn command(action: &str, parameters: &[&str]) -> CallbackAction {
    CallbackAction {
        kind: CallbackKind::Command,
        action: action.to_string(),
        method: None,
        parameters: parameters.iter().map(ToString::to_string).collect(),
    }
}

fn external(url: &str, http_method: &str, parameters: &[&str]) -> CallbackAction {
    CallbackAction {
        kind: CallbackKind::External,
        action: url.to_string(),
        method: Some(http_method.to_string()),
        parameters: parameters.iter().map(ToString::to_string).collect(),
    }
}

fn spec_error(err: &anyhow::Error) -> &SpecError {
    err.downcast_ref::<SpecError>().expect("spec error")
}

fn ctx() -> HookContext {
    HookContext::new(CancellationToken::new())
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_safe_arguments() {
    for arg in ["1.2.3", "release notes", "--flag=value", "path/to/file.php", "a,b"] {
        assert!(is_safe_argument(arg), "{arg} should be safe");
    }
    for arg in ["; rm -rf /", "a && b", "x | y", "$HOME", "`id`", "a > b", "$(id)", "a\nb"] {
        assert!(!is_safe_argument(arg), "{arg:?} should be rejected");
    }
}

#[test]
fn test_validate_command_action() {
    validate_action("deploy", &command("php bin/deploy.php", &["1.2.3"])).unwrap();

    let err = validate_action("deploy", &command("php", &["x; rm -rf /"])).unwrap_err();
    assert!(matches!(spec_error(&err), SpecError::UnsafeArgument(arg) if arg == "x; rm -rf /"));

    let err = validate_action("deploy", &command("php deploy.php|sh", &[])).unwrap_err();
    assert!(matches!(spec_error(&err), SpecError::UnsafeArgument(_)));

    let err = validate_action("deploy", &command("   ", &[])).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid callback for stage 'deploy': command action is empty"
    );
}

#[test]
fn test_validate_external_action() {
    validate_action("lang", &external("https://hooks.example.com/a", "post", &["k=v"])).unwrap();
    validate_action("lang", &external("http://localhost:8080/a?x=1", "GET", &[])).unwrap();

    let err = validate_action("lang", &external("ftp://example.com", "GET", &[])).unwrap_err();
    assert!(matches!(spec_error(&err), SpecError::InvalidUrl(_)));

    let err = validate_action("lang", &external("not a url", "GET", &[])).unwrap_err();
    assert!(matches!(spec_error(&err), SpecError::InvalidUrl(_)));

    let err = validate_action("lang", &external("https://example.com", "PUT", &[])).unwrap_err();
    assert!(matches!(spec_error(&err), SpecError::InvalidCallback { .. }));

    for parameter in ["novalue", "=value", "key="] {
        let err = validate_action("lang", &external("https://example.com", "GET", &[parameter]))
            .unwrap_err();
        assert!(matches!(spec_error(&err), SpecError::InvalidParameter(p) if p == parameter));
    }
}

// =============================================================================
// External hooks
// =============================================================================

#[test]
fn test_request_url_query_separator() {
    let hook = ExternalHook::new(&external("https://x.test/hook", "GET", &["a=1", "b=two words"]));
    assert_eq!(hook.request_url(), "https://x.test/hook?a=1&b=two+words");

    let hook = ExternalHook::new(&external("https://x.test/hook?token=t", "get", &["a=1"]));
    assert_eq!(hook.request_url(), "https://x.test/hook?token=t&a=1");

    let hook = ExternalHook::new(&external("https://x.test/hook", "POST", &["a=1"]));
    assert_eq!(hook.request_url(), "https://x.test/hook");
    assert_eq!(hook.encoded_parameters(), "a=1");
}

#[tokio::test]
async fn test_external_get_sends_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/built"))
        .and(query_param("module", "acme.shop"))
        .and(query_param("version", "1.2.3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/built", server.uri());
    let hook = Hook::new("components", external(&url, "GET", &["module=acme.shop", "version=1.2.3"]));
    hook.run(&ctx()).await.unwrap();
}

#[tokio::test]
async fn test_external_post_sends_form_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/built"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("module=acme.shop&note=a+b"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/built", server.uri());
    let hook = Hook::new("components", external(&url, "POST", &["module=acme.shop", "note=a b"]));
    hook.run(&ctx()).await.unwrap();
}

#[tokio::test]
async fn test_external_non_200_fails() {
    let server = MockServer::start().await;
    for status in [201, 404, 500] {
        server.reset().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let hook = Hook::new("components", external(&server.uri(), "GET", &[]));
        let err = hook.run(&ctx()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HookError>(),
            Some(HookError::HttpStatus { status: s, .. }) if *s == status
        ));
    }
}

#[tokio::test]
async fn test_external_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let hook = Hook::new("components", external(&server.uri(), "GET", &[]));
    let started = Instant::now();
    let err = hook
        .run(&ctx().with_timeout(Duration::from_millis(200)))
        .await
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<HookError>(), Some(HookError::Request { .. })));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_external_invalid_url_is_not_sent() {
    let hook = Hook::new("components", external("mailto:dev@example.com", "GET", &[]));
    let err = hook.run(&ctx()).await.unwrap_err();
    assert!(matches!(spec_error(&err), SpecError::InvalidUrl(_)));
}

// =============================================================================
// Command hooks
// =============================================================================

#[test]
fn test_command_hook_splits_action() {
    let hook = CommandHook::new(&command("php  bin/deploy.php ", &["1.2.3"]));
    assert_eq!(hook.program(), "php");
    assert_eq!(hook.args(), ["bin/deploy.php", "1.2.3"]);
    assert_eq!(hook.describe(), "php bin/deploy.php 1.2.3");
}

#[tokio::test]
async fn test_command_hook_runs_in_cwd() {
    let dir = temp_dir();
    let hook = Hook::new("components", command("touch", &["marker"]));
    hook.run(&ctx().with_cwd(dir.path())).await.unwrap();
    assert!(dir.path().join("marker").exists());
}

#[tokio::test]
async fn test_command_hook_failure() {
    let hook = Hook::new("components", command("false", &[]));
    let err = hook.run(&ctx()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HookError>(),
        Some(HookError::NonZeroExit { .. })
    ));
}

#[test]
fn test_command_hook_deadline_is_a_warning() {
    let hook = Hook::new("components", command("sleep", &["30"]));
    let context = ctx().with_timeout(Duration::from_millis(200));
    let started = Instant::now();

    let mut result = None;
    let logs = capture_logs(|| {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        result = Some(runtime.block_on(hook.run(&context)));
    });

    result.expect("hook ran").unwrap();
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(logs.contains("command hook stopped at its deadline"), "{logs}");
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_hook_deadline_stops_script_children() {
    let dir = temp_dir();
    std::fs::write(
        dir.path().join("deploy.sh"),
        "(sleep 2; touch late.marker) &\nsleep 30\n",
    )
    .unwrap();
    let hook = Hook::new("components", command("sh deploy.sh", &[]));
    let context = ctx()
        .with_cwd(dir.path())
        .with_timeout(Duration::from_millis(500));

    let started = Instant::now();
    hook.run(&context).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!dir.path().join("late.marker").exists());
}

#[tokio::test]
async fn test_command_hook_cancelled() {
    let token = CancellationToken::new();
    token.cancel();
    let hook = Hook::new("components", command("sleep", &["30"]));
    let err = hook.run(&HookContext::new(token)).await.unwrap_err();
    assert!(BuildError::matches(&err, |e| matches!(e, BuildError::Cancelled)));
}

#[tokio::test]
async fn test_command_hook_rejects_unsafe_argument_before_spawning() {
    let dir = temp_dir();
    let hook = Hook::new("components", command("touch", &["marker;"]));
    let err = hook.run(&ctx().with_cwd(dir.path())).await.unwrap_err();
    assert!(matches!(spec_error(&err), SpecError::UnsafeArgument(_)));
    assert!(!dir.path().join("marker;").exists());
}
