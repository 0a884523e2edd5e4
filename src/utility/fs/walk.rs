// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{FsError, Result, SpecError};
use crate::git::changelog::Changes;
use crate::module::FileExistsAction;
use anyhow::Context;
use bon::Builder;
use flume::Sender;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use wax::{Glob, Program};

/// One concrete file copy, produced by the walker and consumed by a copy worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTask {
    pub from: PathBuf,
    pub to: PathBuf,
    pub action: FileExistsAction,
    pub convert: bool,
}

/// One `from` entry of a stage, with its absolute destination directory.
#[derive(Debug, Clone, Builder)]
pub struct SourceJob {
    #[builder(into)]
    from: PathBuf,
    #[builder(into)]
    to: PathBuf,
    #[builder(default)]
    action: FileExistsAction,
    #[builder(default = false)]
    convert: bool,
}

/// Repository changes used to restrict copying to touched files.
#[derive(Debug, Clone)]
pub struct Incremental {
    changes: Arc<Changes>,
    repository: PathBuf,
}

impl Incremental {
    /// Creates an incremental filter rooted at `repository`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository path cannot be canonicalized.
    pub fn new(changes: Arc<Changes>, repository: &Path) -> Result<Self> {
        let repository = repository
            .canonicalize()
            .with_context(|| format!("failed to resolve repository {}", repository.display()))?;
        Ok(Self {
            changes,
            repository,
        })
    }

    /// Returns whether `path` was added, modified or moved in the repository.
    #[must_use]
    pub fn is_changed(&self, path: &Path) -> bool {
        path.strip_prefix(&self.repository)
            .ok()
            .and_then(|rel| to_slash(rel))
            .is_some_and(|rel| self.changes.is_copyable(&rel))
    }
}

/// Compiled ignore and include/exclude globs.
#[derive(Debug, Default)]
pub struct FilterRules {
    ignore: Vec<Glob<'static>>,
    include: Vec<Glob<'static>>,
    exclude: Vec<Glob<'static>>,
}

fn compile(pattern: &str) -> Result<Glob<'static>> {
    Glob::new(pattern).map(Glob::into_owned).map_err(|e| {
        SpecError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

impl FilterRules {
    /// Compiles module-level ignore globs and stage filter globs.
    ///
    /// Filter entries prefixed with `!` are exclusions.
    ///
    /// # Errors
    ///
    /// Returns `SpecError::InvalidGlob` for a pattern that does not compile.
    pub fn new(ignore: &[String], filter: &[String]) -> Result<Self> {
        let mut rules = Self {
            ignore: ignore.iter().map(|p| compile(p)).collect::<Result<_>>()?,
            ..Self::default()
        };
        for pattern in filter {
            match pattern.strip_prefix('!') {
                Some(excluded) => rules.exclude.push(compile(excluded)?),
                None => rules.include.push(compile(pattern)?),
            }
        }
        Ok(rules)
    }

    #[must_use]
    pub fn is_ignored(&self, relative: &Path) -> bool {
        self.ignore.iter().any(|glob| glob.is_match(relative))
    }

    /// Exclusion always wins; without inclusion patterns everything is included.
    #[must_use]
    pub fn is_included(&self, relative: &Path) -> bool {
        let included =
            self.include.is_empty() || self.include.iter().any(|glob| glob.is_match(relative));
        included && !self.exclude.iter().any(|glob| glob.is_match(relative))
    }
}

fn to_slash(path: &Path) -> Option<String> {
    let parts: Option<Vec<&str>> = path.iter().map(|c| c.to_str()).collect();
    parts.map(|parts| parts.join("/"))
}

/// Walks one stage source and enqueues a [`CopyTask`] per qualifying file.
///
/// Ignored directories are pruned as whole subtrees. Filters and ignore
/// globs match the path relative to the source root. With `incremental`
/// set, only added, modified or moved files are enqueued. Destination
/// directories are created before a task is enqueued.
///
/// Returns the number of enqueued tasks. Stops early, without error, once
/// `cancel` fires or the queue is closed.
///
/// # Errors
///
/// Returns an error if the source is missing, a directory cannot be read,
/// or a destination directory cannot be created.
pub fn path_processing(
    job: &SourceJob,
    rules: &Arc<FilterRules>,
    incremental: Option<&Incremental>,
    queue: &Sender<CopyTask>,
    cancel: &CancellationToken,
) -> Result<usize> {
    let root = job
        .from
        .canonicalize()
        .map_err(|_| FsError::NotFound(job.from.display().to_string()))?;

    if root.is_file() {
        let name = root.file_name().map(PathBuf::from).unwrap_or_default();
        if rules.is_ignored(&name) || !rules.is_included(&name) {
            return Ok(0);
        }
        if incremental.is_some_and(|inc| !inc.is_changed(&root)) {
            return Ok(0);
        }
        return Ok(usize::from(enqueue(job, &root, &name, queue)?));
    }

    let mut builder = WalkBuilder::new(&root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));
    {
        let rules = Arc::clone(rules);
        let prune_root = root.clone();
        builder.filter_entry(move |entry| {
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            entry
                .path()
                .strip_prefix(&prune_root)
                .map_or(true, |rel| rel.as_os_str().is_empty() || !rules.is_ignored(rel))
        });
    }

    let mut queued = 0;
    for entry in builder.build() {
        if cancel.is_cancelled() {
            debug!(from = %root.display(), "walk cancelled");
            break;
        }
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(&root) else {
            continue;
        };
        if rules.is_ignored(relative) || !rules.is_included(relative) {
            trace!(path = %path.display(), "filtered out");
            continue;
        }
        if incremental.is_some_and(|inc| !inc.is_changed(path)) {
            trace!(path = %path.display(), "unchanged in repository");
            continue;
        }
        if !enqueue(job, path, relative, queue)? {
            break;
        }
        queued += 1;
    }
    Ok(queued)
}

/// Returns `false` when the queue has been closed.
fn enqueue(job: &SourceJob, path: &Path, relative: &Path, queue: &Sender<CopyTask>) -> Result<bool> {
    let to = job.to.join(relative);
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(|source| FsError::IoError {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let task = CopyTask {
        from: path.to_path_buf(),
        to,
        action: job.action,
        convert: job.convert,
    };
    Ok(queue.send(task).is_ok())
}
