// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared test utilities.
//!
//! Real repositories are built through the `git` CLI; [`FixedHistory`] is an
//! in-memory [`GitHistory`] for tests that only need a diff.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::{GitError, ModpackResult};
use crate::git::backend::{FilePatch, GitHistory};
use crate::logging::BuildLogger;

pub(crate) fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// A throwaway git repository driven by the git CLI.
pub(crate) struct TestRepo {
    pub(crate) dir: TempDir,
}

impl TestRepo {
    pub(crate) fn new() -> Self {
        let repo = Self { dir: temp_dir() };
        repo.git(&["init", "--quiet"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "user.name", "Test"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("failed to run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub(crate) fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        std::fs::create_dir_all(path.parent().expect("file has a parent"))
            .expect("failed to create parent");
        std::fs::write(&path, content).expect("failed to write file");
        path
    }

    /// Stages everything and commits; returns the new HEAD hash.
    pub(crate) fn commit(&self, message: &str) -> String {
        self.git(&["add", "-A"]);
        self.git(&["commit", "--quiet", "--allow-empty", "-m", message]);
        self.head()
    }

    pub(crate) fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }

    pub(crate) fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }
}

/// In-memory history returning a fixed diff and subject list.
#[derive(Debug, Default)]
pub(crate) struct FixedHistory {
    pub(crate) patches: Vec<FilePatch>,
    pub(crate) subjects: Vec<String>,
    pub(crate) fail: bool,
}

impl FixedHistory {
    pub(crate) fn with_patches(patches: Vec<FilePatch>) -> Self {
        Self {
            patches,
            ..Self::default()
        }
    }
}

impl GitHistory for FixedHistory {
    fn resolve_revision(&self, _repo: &Path, revision: &str) -> ModpackResult<String> {
        if self.fail {
            return Err(GitError::RevisionNotFound {
                revision: revision.to_string(),
            }
            .into());
        }
        Ok(format!("resolved-{revision}"))
    }

    fn commit_subjects(&self, _repo: &Path, _start: &str, _end: &str) -> ModpackResult<Vec<String>> {
        Ok(self.subjects.clone())
    }

    fn diff(&self, _repo: &Path, _start: &str, _end: &str) -> ModpackResult<Vec<FilePatch>> {
        Ok(self.patches.clone())
    }
}

#[derive(Clone)]
struct BufferWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| std::io::Error::other("buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
struct BufferMakeWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for BufferMakeWriter {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter {
            buffer: self.buffer.clone(),
        }
    }
}

/// Runs a closure while capturing tracing output of the current thread.
pub(crate) fn capture_logs(f: impl FnOnce()) -> String {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(BufferMakeWriter {
            buffer: buffer.clone(),
        })
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.lock().expect("buffer poisoned").clone();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Build logger that records every message in memory.
#[derive(Debug, Default)]
pub(crate) struct RecordingLogger {
    lines: Mutex<Vec<String>>,
    cleaned: std::sync::atomic::AtomicBool,
}

impl RecordingLogger {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("logger poisoned").clone()
    }

    pub(crate) fn is_cleaned(&self) -> bool {
        self.cleaned.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl BuildLogger for RecordingLogger {
    fn info(&self, message: &str) {
        self.lines
            .lock()
            .expect("logger poisoned")
            .push(format!("INFO {message}"));
    }

    fn error(&self, message: &str, err: &anyhow::Error) {
        self.lines
            .lock()
            .expect("logger poisoned")
            .push(format!("ERROR {message}: {err}"));
    }

    fn cleanup(&self) {
        self.cleaned.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}
