// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::builder::ProcessBuilder;
use crate::error::HookError;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_process_echo() {
    let output = ProcessBuilder::which("echo")
        .arg("hello")
        .run_with_cancellation(CancellationToken::new())
        .await
        .expect("echo should succeed");

    assert_eq!(output.exit_code(), 0);
    assert!(!output.is_timed_out());
    assert!(!output.is_interrupted());
}

#[tokio::test]
async fn test_process_long_output_does_not_stall() {
    let output = ProcessBuilder::new("sh")
        .args(["-c", "i=0; while [ $i -lt 5000 ]; do echo line $i; i=$((i+1)); done"])
        .timeout(Duration::from_secs(20))
        .run_with_cancellation(CancellationToken::new())
        .await
        .expect("chatty process should succeed");

    assert!(!output.is_timed_out());
    assert_eq!(output.exit_code(), 0);
}

#[tokio::test]
async fn test_process_non_zero_exit() {
    let err = ProcessBuilder::new("sh")
        .args(["-c", "exit 42"])
        .run_with_cancellation(CancellationToken::new())
        .await
        .unwrap_err();

    let hook = err.downcast_ref::<HookError>().expect("hook error");
    assert!(matches!(hook, HookError::NonZeroExit { code: 42, .. }));
}

#[tokio::test]
async fn test_process_spawn_failure() {
    let err = ProcessBuilder::new("/definitely/not/a/program")
        .run_with_cancellation(CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HookError>(),
        Some(HookError::Spawn { .. })
    ));
}

#[tokio::test]
async fn test_process_deadline_kills_child() {
    let started = Instant::now();
    let output = ProcessBuilder::which("sleep")
        .arg("30")
        .timeout(Duration::from_millis(200))
        .run_with_cancellation(CancellationToken::new())
        .await
        .expect("a killed process is not an error");

    assert!(output.is_timed_out());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[cfg(unix)]
#[tokio::test]
async fn test_process_deadline_kills_descendants() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tree.sh"), "sleep 30 &\nsleep 30\n").unwrap();

    let started = Instant::now();
    let output = ProcessBuilder::new("sh")
        .arg("tree.sh")
        .cwd(dir.path())
        .timeout(Duration::from_millis(300))
        .run_with_cancellation(CancellationToken::new())
        .await
        .expect("a killed process is not an error");

    assert!(output.is_timed_out());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_process_cancellation_kills_child() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let output = ProcessBuilder::which("sleep")
        .arg("30")
        .run_with_cancellation(token)
        .await
        .expect("cancellation is not an error");
    assert!(output.is_interrupted());
}

#[tokio::test]
async fn test_process_already_cancelled_does_not_spawn() {
    let token = CancellationToken::new();
    token.cancel();
    let output = ProcessBuilder::new("/definitely/not/a/program")
        .run_with_cancellation(token)
        .await
        .expect("nothing is spawned");
    assert!(output.is_interrupted());
}

#[test]
fn test_command_line_quotes_spaces() {
    let builder = ProcessBuilder::new("php").args(["bin/deploy.php", "release notes"]);
    assert_eq!(builder.command_line(), "php bin/deploy.php \"release notes\"");
}

#[test]
fn test_executable_lookup_cached() {
    let first = ProcessBuilder::find("sh").expect("sh should be in PATH");
    let second = ProcessBuilder::find("sh").expect("cached");
    assert_eq!(first, second);
    assert!(ProcessBuilder::find("definitely-not-a-real-program-xyz").is_none());
}
