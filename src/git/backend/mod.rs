// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! GitHistory (read) --> GixBackend   (gix; diff needs the git CLI)
//!                   --> ShellBackend (git CLI)
//! ```

use std::path::Path;

use crate::error::{GitError, ModpackResult};

/// One file entry of a tree diff.
///
/// `before` is the path in the start tree, `after` the path in the end tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    pub before: Option<String>,
    pub after: Option<String>,
}

impl FilePatch {
    #[must_use]
    pub const fn new(before: Option<String>, after: Option<String>) -> Self {
        Self { before, after }
    }
}

// --- History Trait (Read-only operations) ---

/// Read-only access to repository history.
///
/// Implementors are injected into the module and builder, so tests can
/// substitute a fixed history.
pub trait GitHistory: Send + Sync {
    /// Resolves a tag, branch or commit-ish to a full commit hash.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepoNotFound` or `GitError::RevisionNotFound`.
    fn resolve_revision(&self, repo: &Path, revision: &str) -> ModpackResult<String>;

    /// Returns the subject lines of the commits reachable from `end`, newest
    /// first, stopping before `start`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if either revision is unknown or the walk fails.
    fn commit_subjects(&self, repo: &Path, start: &str, end: &str) -> ModpackResult<Vec<String>>;

    /// Returns the file-level diff between two commits with rename detection.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the diff cannot be computed.
    fn diff(&self, repo: &Path, start: &str, end: &str) -> ModpackResult<Vec<FilePatch>>;
}

// --- GixBackend Implementation (Pure Rust) ---

/// Git backend using gix for revision parsing and history walks.
///
/// Tree diffs with rename detection go through [`ShellBackend`], so
/// [`GitHistory::diff`] needs a `git` binary on `PATH`. Both revisions are
/// resolved in-process first, so an unknown revision is reported the same way
/// as by the other operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct GixBackend;

impl GixBackend {
    fn open(repo: &Path) -> ModpackResult<gix::Repository> {
        gix::discover(repo).map_err(|_| {
            GitError::RepoNotFound {
                path: repo.display().to_string(),
            }
            .into()
        })
    }

    fn commit_id(repo: &gix::Repository, revision: &str) -> ModpackResult<gix::ObjectId> {
        let spec = format!("{revision}^{{commit}}");
        repo.rev_parse_single(spec.as_str())
            .map(gix::Id::detach)
            .map_err(|_| {
                GitError::RevisionNotFound {
                    revision: revision.to_string(),
                }
                .into()
            })
    }
}

impl GitHistory for GixBackend {
    fn resolve_revision(&self, repo: &Path, revision: &str) -> ModpackResult<String> {
        let repo = Self::open(repo)?;
        Ok(Self::commit_id(&repo, revision)?.to_string())
    }

    fn commit_subjects(&self, repo: &Path, start: &str, end: &str) -> ModpackResult<Vec<String>> {
        let repo = Self::open(repo)?;
        let start = Self::commit_id(&repo, start)?;
        let end = Self::commit_id(&repo, end)?;

        let walk = repo
            .rev_walk([end])
            .all()
            .map_err(|e| GitError::Walk(e.to_string()))?;

        let mut subjects = Vec::new();
        for info in walk {
            let info = info.map_err(|e| GitError::Walk(e.to_string()))?;
            if info.id == start {
                break;
            }
            let commit = info.object().map_err(|e| GitError::Walk(e.to_string()))?;
            let message = String::from_utf8_lossy(commit.message_raw_sloppy().as_ref()).into_owned();
            subjects.push(message.lines().next().unwrap_or_default().to_string());
        }
        Ok(subjects)
    }

    fn diff(&self, repo: &Path, start: &str, end: &str) -> ModpackResult<Vec<FilePatch>> {
        let (start, end) = {
            let repo = Self::open(repo)?;
            (
                Self::commit_id(&repo, start)?.to_string(),
                Self::commit_id(&repo, end)?.to_string(),
            )
        };
        ShellBackend.diff(repo, &start, &end)
    }
}

// --- ShellBackend Implementation (Git CLI) ---

/// Shell-based git backend using git CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellBackend;

impl ShellBackend {
    /// Execute a git command. Sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`.
    pub(crate) fn git_command(args: &[&str], cwd: &Path) -> ModpackResult<String> {
        use std::process::Command;

        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| std::io::Error::new(e.kind(), format!("failed to execute git: {e}")))?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl GitHistory for ShellBackend {
    fn resolve_revision(&self, repo: &Path, revision: &str) -> ModpackResult<String> {
        if !repo.is_dir() {
            return Err(GitError::RepoNotFound {
                path: repo.display().to_string(),
            }
            .into());
        }
        let spec = format!("{revision}^{{commit}}");
        Self::git_command(&["rev-parse", "--verify", "--quiet", &spec], repo).map_err(|_| {
            GitError::RevisionNotFound {
                revision: revision.to_string(),
            }
            .into()
        })
    }

    fn commit_subjects(&self, repo: &Path, start: &str, end: &str) -> ModpackResult<Vec<String>> {
        let start = self.resolve_revision(repo, start)?;
        let end = self.resolve_revision(repo, end)?;
        let output = Self::git_command(&["log", "--format=%H %s", &end], repo)?;

        let mut subjects = Vec::new();
        for line in output.lines() {
            let (hash, subject) = line.split_once(' ').unwrap_or((line, ""));
            if hash == start {
                break;
            }
            subjects.push(subject.to_string());
        }
        Ok(subjects)
    }

    fn diff(&self, repo: &Path, start: &str, end: &str) -> ModpackResult<Vec<FilePatch>> {
        let output = Self::git_command(&["diff", "--name-status", "-z", "-M", start, end], repo)?;
        parse_name_status(&output)
    }
}

/// Parses NUL-separated `git diff --name-status -z` output.
///
/// Renames and copies carry two paths, every other status one.
pub(crate) fn parse_name_status(output: &str) -> ModpackResult<Vec<FilePatch>> {
    let mut fields = output.split('\0').filter(|f| !f.is_empty());
    let mut patches = Vec::new();

    while let Some(status) = fields.next() {
        let mut next_path = || {
            fields.next().map(str::to_string).ok_or_else(|| GitError::CommandFailed {
                command: "git diff".to_string(),
                message: format!("truncated entry for status '{status}'"),
            })
        };
        let patch = match status.chars().next() {
            Some('A') => FilePatch::new(None, Some(next_path()?)),
            Some('D') => FilePatch::new(Some(next_path()?), None),
            Some('R') => {
                let before = next_path()?;
                FilePatch::new(Some(before), Some(next_path()?))
            }
            Some('C') => {
                let _source = next_path()?;
                FilePatch::new(None, Some(next_path()?))
            }
            _ => {
                let path = next_path()?;
                FilePatch::new(Some(path.clone()), Some(path))
            }
        };
        patches.push(patch);
    }
    Ok(patches)
}

#[cfg(test)]
mod tests;
