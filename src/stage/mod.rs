// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Concurrent stage execution.
//!
//! ```text
//! handle_stages(names)
//!   |
//!   +-- stage task (one per name) ------------------------------+
//!   |     log "started" -> pre-hook -> mkdir to                 |
//!   |     walkers (spawn_blocking, one per from) --> files_tx --+--> copy workers
//!   |     post-hook -> log "finished"                           |     (drain until closed)
//!   |                                                           |
//!   +-- error sink: first error wins, cancels the token         |
//!   +-- log sink:   forwards to BuildLogger                     |
//!   +-- coordinator: stages done -> close files -> workers done -> close log/err
//! ```
//!
//! Errors from a stage are wrapped in `BuildError::Stage`. Workers keep
//! draining the queue after cancellation so walkers never block on a full
//! channel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use flume::{Receiver, Sender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::config::BuildSettings;
use crate::error::{BuildError, FsError, Result, SpecError};
use crate::git::backend::GitHistory;
use crate::hook::{Hook, HookContext, Runnable};
use crate::logging::BuildLogger;
use crate::module::{CallbackAction, ModuleSpec, Stage};
use crate::utility::fs::copy::{CopyOutcome, copy_file};
use crate::utility::fs::walk::{CopyTask, FilterRules, Incremental, SourceJob, path_processing};

/// Where stage destinations are rooted and whether history filters the copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageMode {
    /// `{buildDirectory}/{version}`, restricted to changed files when the
    /// module has a repository and an enabled changelog.
    Release,
    /// `{buildDirectory}/.last_version`, always a full copy.
    LastVersion,
    /// Destinations relative to `root`, full copy, no version directory.
    AdHoc { root: PathBuf },
}

/// Shared collaborators of a stage run.
#[derive(Clone)]
pub struct StageContext {
    cancel_token: CancellationToken,
    logger: Arc<dyn BuildLogger>,
    history: Arc<dyn GitHistory>,
    settings: BuildSettings,
}

impl StageContext {
    #[must_use]
    pub fn new(
        cancel_token: CancellationToken,
        logger: Arc<dyn BuildLogger>,
        history: Arc<dyn GitHistory>,
        settings: BuildSettings,
    ) -> Self {
        Self {
            cancel_token,
            logger,
            history,
            settings,
        }
    }

    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    #[must_use]
    pub fn logger(&self) -> &Arc<dyn BuildLogger> {
        &self.logger
    }

    #[must_use]
    pub fn history(&self) -> &Arc<dyn GitHistory> {
        &self.history
    }

    #[must_use]
    pub const fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

impl std::fmt::Debug for StageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageContext")
            .field("cancelled", &self.is_cancelled())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Everything one stage task needs, cloned per stage.
#[derive(Clone)]
struct StageRun {
    root: PathBuf,
    ignore: Arc<[String]>,
    incremental: Option<Arc<Incremental>>,
    hook_ctx: HookContext,
    files: Sender<CopyTask>,
    log: Sender<String>,
    cancel: CancellationToken,
}

fn stage_error(stage: &str, source: anyhow::Error) -> anyhow::Error {
    BuildError::Stage {
        stage: stage.to_string(),
        source,
    }
    .into()
}

/// Resolves every name to its expanded stage definition.
fn resolve_stages(module: &ModuleSpec, names: &[String]) -> Result<Vec<Stage>> {
    names
        .iter()
        .map(|name| {
            module.stage(name).ok_or_else(|| {
                SpecError::UnknownStage {
                    list: "stages".to_string(),
                    stage: name.clone(),
                }
                .into()
            })
        })
        .collect()
}

async fn incremental_filter(
    ctx: &StageContext,
    module: &Arc<ModuleSpec>,
) -> Result<Option<Arc<Incremental>>> {
    let module = Arc::clone(module);
    let history = Arc::clone(ctx.history());
    tokio::task::spawn_blocking(move || {
        let Some(changes) = module.changes(history.as_ref())? else {
            return Ok(None);
        };
        let Some(repository) = module.repository.as_deref() else {
            return Ok(None);
        };
        debug!(
            added = changes.added.len(),
            modified = changes.modified.len(),
            moved = changes.moved.len(),
            deleted = changes.deleted.len(),
            "incremental build"
        );
        Incremental::new(changes, repository).map(|inc| Some(Arc::new(inc)))
    })
    .await?
}

/// Runs the named stages concurrently and returns the first error.
///
/// Unless `mode` is ad hoc, the module needs a build directory. Every
/// stage emits a start and a finish message through the context logger.
/// A failing stage cancels the others; files already being written are
/// completed.
///
/// # Errors
///
/// Returns the first error raised by any stage, hook or copy, wrapped in
/// `BuildError::Stage` where it belongs to a stage. Returns
/// `BuildError::Cancelled` if the context was cancelled from outside.
pub async fn handle_stages(
    ctx: &StageContext,
    names: &[String],
    module: &Arc<ModuleSpec>,
    mode: StageMode,
) -> Result<()> {
    let root = match &mode {
        StageMode::Release => module.version_directory(false)?,
        StageMode::LastVersion => module.version_directory(true)?,
        StageMode::AdHoc { root } => root.clone(),
    };
    let stages = resolve_stages(module, names)?;
    let incremental = match mode {
        StageMode::Release => incremental_filter(ctx, module).await?,
        StageMode::LastVersion | StageMode::AdHoc { .. } => None,
    };

    let sources = stages.iter().map(|s| s.from.len()).sum();
    let worker_count = ctx.settings().worker_count(sources);
    let capacity = ctx.settings().queue_capacity;
    debug!(stages = stages.len(), workers = worker_count, root = %root.display(), "handling stages");

    let cancel = ctx.cancel_token().child_token();
    let (files_tx, files_rx) = flume::bounded::<CopyTask>(capacity);
    let (log_tx, log_rx) = flume::bounded::<String>(capacity);
    let (err_tx, err_rx) = flume::bounded::<anyhow::Error>(1);

    let error_task = tokio::spawn(error_sink(
        err_rx,
        Arc::clone(ctx.logger()),
        cancel.clone(),
    ));
    let log_task = tokio::spawn(log_sink(log_rx, Arc::clone(ctx.logger())));

    let mut workers = JoinSet::new();
    for _ in 0..worker_count {
        workers.spawn(copy_worker(files_rx.clone(), err_tx.clone(), cancel.clone()));
    }
    drop(files_rx);

    let mut hook_ctx = HookContext::new(cancel.clone()).with_timeout(ctx.settings().hook_timeout());
    if let Some(repository) = module.repository.as_deref() {
        hook_ctx = hook_ctx.with_cwd(repository);
    }
    let run = StageRun {
        root,
        ignore: module.ignore.clone().into(),
        incremental,
        hook_ctx,
        files: files_tx,
        log: log_tx,
        cancel: cancel.clone(),
    };

    let mut stage_tasks = JoinSet::new();
    for stage in stages {
        let callback = module.callback(&stage.name);
        let (pre, post) = callback.map_or((None, None), |c| (c.pre, c.post));
        let run = run.clone();
        let err_tx = err_tx.clone();
        stage_tasks.spawn(async move {
            let name = stage.name.clone();
            if let Err(err) = run_stage(&run, stage, pre, post).await {
                let _ = err_tx.send_async(stage_error(&name, err)).await;
            }
        });
    }
    drop(run);

    let coordinator = tokio::spawn(async move {
        while let Some(joined) = stage_tasks.join_next().await {
            if let Err(join) = joined {
                let _ = err_tx
                    .send_async(anyhow::anyhow!("stage task panicked: {join}"))
                    .await;
            }
        }
        // All stage tasks own the remaining `files` senders; the queue is now closed.
        while let Some(joined) = workers.join_next().await {
            if let Err(join) = joined {
                let _ = err_tx
                    .send_async(anyhow::anyhow!("copy worker panicked: {join}"))
                    .await;
            }
        }
        drop(err_tx);
        cancel.cancel();
    });

    coordinator.await?;
    let first_error = error_task.await?;
    log_task.await?;

    match first_error {
        Some(err) => Err(err),
        None if ctx.is_cancelled() => Err(BuildError::Cancelled.into()),
        None => Ok(()),
    }
}

async fn run_stage(
    run: &StageRun,
    stage: Stage,
    pre: Option<CallbackAction>,
    post: Option<CallbackAction>,
) -> Result<()> {
    let _ = run
        .log
        .send_async(format!("stage {} started", stage.name))
        .await;

    if let Some(action) = pre {
        Hook::new(&stage.name, action).run(&run.hook_ctx).await?;
    }
    if run.cancel.is_cancelled() {
        debug!(stage = %stage.name, "stage cancelled before copying");
        return Ok(());
    }

    let destination = run.root.join(&stage.to);
    tokio::fs::create_dir_all(&destination)
        .await
        .map_err(|source| FsError::IoError {
            path: destination.display().to_string(),
            source,
        })?;

    let rules = Arc::new(FilterRules::new(&run.ignore, &stage.filter)?);
    let mut walkers = JoinSet::new();
    for from in &stage.from {
        let job = SourceJob::builder()
            .from(from.as_str())
            .to(destination.clone())
            .action(stage.action())
            .convert(stage.convert_to_1251)
            .build();
        let rules = Arc::clone(&rules);
        let incremental = run.incremental.clone();
        let files = run.files.clone();
        let cancel = run.cancel.clone();
        walkers.spawn_blocking(move || {
            path_processing(&job, &rules, incremental.as_deref(), &files, &cancel)
        });
    }

    let mut queued = 0;
    let mut first_error = None;
    while let Some(joined) = walkers.join_next().await {
        match joined {
            Ok(Ok(count)) => queued += count,
            Ok(Err(err)) => {
                first_error.get_or_insert(err);
            }
            Err(join) => {
                first_error.get_or_insert(anyhow::anyhow!("walker panicked: {join}"));
            }
        }
    }
    if let Some(err) = first_error {
        return Err(err);
    }

    if let Some(action) = post
        && !run.cancel.is_cancelled()
    {
        Hook::new(&stage.name, action).run(&run.hook_ctx).await?;
    }

    let _ = run
        .log
        .send_async(format!("stage {} finished, {queued} files queued", stage.name))
        .await;
    Ok(())
}

async fn copy_worker(
    files: Receiver<CopyTask>,
    errors: Sender<anyhow::Error>,
    cancel: CancellationToken,
) {
    while let Ok(task) = files.recv_async().await {
        match copy_file(&task, &cancel).await {
            Ok(CopyOutcome::Copied | CopyOutcome::Converted) => {
                debug!(to = %task.to.display(), "copied");
            }
            Ok(CopyOutcome::Skipped) => trace!(to = %task.to.display(), "kept existing file"),
            Ok(CopyOutcome::Cancelled) => {}
            Err(err) => {
                let _ = errors.send_async(err).await;
            }
        }
    }
}

async fn error_sink(
    errors: Receiver<anyhow::Error>,
    logger: Arc<dyn BuildLogger>,
    cancel: CancellationToken,
) -> Option<anyhow::Error> {
    let mut first = None;
    while let Ok(err) = errors.recv_async().await {
        if first.is_none() {
            logger.error("stage run failed", &err);
            cancel.cancel();
            first = Some(err);
        } else {
            warn!(error = format!("{err:#}"), "additional stage error");
        }
    }
    first
}

async fn log_sink(messages: Receiver<String>, logger: Arc<dyn BuildLogger>) {
    while let Ok(message) = messages.recv_async().await {
        logger.info(&message);
    }
}

/// Checks that every source path of every stage exists.
///
/// All stages are checked concurrently and every problem is reported.
///
/// # Errors
///
/// Returns `BuildError::StageCheck` listing each missing source.
pub async fn check_stages(module: &ModuleSpec) -> Result<()> {
    let mut checks = JoinSet::new();
    for (index, stage) in module.stages.iter().enumerate() {
        let Some(stage) = module.stage(&stage.name) else {
            continue;
        };
        checks.spawn(async move { (index, check_stage(&stage).await) });
    }

    let mut results = Vec::new();
    while let Some(joined) = checks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(join) => results.push((usize::MAX, vec![format!("stage check panicked: {join}")])),
        }
    }
    results.sort_by_key(|(index, _)| *index);

    let errors: Vec<String> = results.into_iter().flat_map(|(_, e)| e).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(BuildError::StageCheck { errors }.into())
    }
}

async fn check_stage(stage: &Stage) -> Vec<String> {
    let mut errors = Vec::new();
    for from in &stage.from {
        if !tokio::fs::try_exists(Path::new(from)).await.unwrap_or(false) {
            errors.push(format!(
                "stage '{}': source '{from}' does not exist",
                stage.name
            ));
        }
    }
    errors
}
