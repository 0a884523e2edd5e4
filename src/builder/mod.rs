// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Build lifecycle.
//!
//! ```text
//! ModuleBuilder::new(module, ctx)
//!   .build()
//!       prepare()   check_stages, default dirs, mkdir build/log/version
//!       collect()   handle_stages
//!                   prune empty dirs --> NoChanges
//!                   description.ru (1251), install/version.php
//!                   zip_it --> {buildDirectory}/{version}.zip
//!       rollback()  on failure: remove the zip written by this run,
//!                   version dir
//!   .cleanup()      always: remove version dir, release logger
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::error::{BuildError, FsError, Result};
use crate::git::backend::GitHistory;
use crate::git::changelog::{commit_list, render_notes};
use crate::module::ModuleSpec;
use crate::stage::{StageContext, StageMode, check_stages, handle_stages};
use crate::utility::encoding::{DESCRIPTION_FILE, to_windows_1251};
use crate::utility::fs::archive::zip_it;
use crate::utility::fs::{is_empty_dir, remove_empty_dirs};

/// Path of the version file inside the version directory.
pub const VERSION_FILE: &str = "install/version.php";

/// Renders `install/version.php`.
#[must_use]
pub fn version_php(version: &str, date: NaiveDateTime) -> String {
    format!(
        "<?php\n$arModuleVersion = array(\n\t\"VERSION\" => \"{version}\",\n\t\"VERSION_DATE\" => \"{}\"\n);\n",
        date.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Returns the module description: the explicit one, else the rendered
/// commit log of the changelog range.
///
/// Returns `None` when neither yields any text.
///
/// # Errors
///
/// Returns an error if the commit log cannot be read.
pub fn description_text(module: &ModuleSpec, history: &dyn GitHistory) -> Result<Option<String>> {
    if let Some(description) = module.description.as_deref().map(str::trim)
        && !description.is_empty()
    {
        return Ok(Some(description.to_string()));
    }
    let Some(repository) = module.repository.as_deref() else {
        return Ok(None);
    };
    let subjects = commit_list(history, repository, &module.changelog)?;
    let footer = module
        .changelog
        .footer_template
        .as_deref()
        .map(|template| module.expand(template));
    let notes = render_notes(&module.changelog, &subjects, footer.as_deref());
    Ok((!notes.is_empty()).then_some(notes))
}

fn io_error(path: &Path, source: std::io::Error) -> FsError {
    FsError::IoError {
        path: path.display().to_string(),
        source,
    }
}

/// Drives one module build from staging to archive.
#[derive(Debug)]
pub struct ModuleBuilder {
    module: Arc<ModuleSpec>,
    ctx: StageContext,
    last_version: bool,
    /// Archive this builder started writing.
    archive: Option<PathBuf>,
}

impl ModuleBuilder {
    #[must_use]
    pub fn new(module: ModuleSpec, ctx: StageContext) -> Self {
        Self {
            module: Arc::new(module),
            ctx,
            last_version: false,
            archive: None,
        }
    }

    /// Builds the "last version" flavour instead of a release.
    #[must_use]
    pub const fn with_last_version(mut self, last_version: bool) -> Self {
        self.last_version = last_version;
        self
    }

    #[must_use]
    pub fn module(&self) -> &ModuleSpec {
        &self.module
    }

    #[must_use]
    pub const fn is_last_version(&self) -> bool {
        self.last_version
    }

    /// Runs `prepare` and `collect`, rolling back if either fails.
    ///
    /// Returns the archive path. The caller is expected to call
    /// [`cleanup`](Self::cleanup) afterwards in every case.
    ///
    /// # Errors
    ///
    /// Returns the error of the failing step.
    pub async fn build(&mut self) -> Result<PathBuf> {
        let result = match self.prepare().await {
            Ok(()) => self.collect().await,
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            if BuildError::is_no_changes(err) {
                self.ctx.logger().info("nothing changed, no archive produced");
            } else {
                self.ctx.logger().error("build failed", err);
            }
            self.rollback().await;
        }
        result
    }

    /// Checks stage sources and creates the build, log and version directories.
    ///
    /// Missing build and log directories default to the configured ones.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::StageCheck` for missing sources, or an error if
    /// a directory cannot be created.
    pub async fn prepare(&mut self) -> Result<()> {
        check_stages(&self.module).await?;

        let settings = self.ctx.settings();
        if self.module.build_directory.is_none() || self.module.log_directory.is_none() {
            let module = Arc::make_mut(&mut self.module);
            module
                .build_directory
                .get_or_insert_with(|| settings.default_build_directory.clone());
            module
                .log_directory
                .get_or_insert_with(|| settings.default_log_directory.clone());
        }

        let version_dir = self.module.version_directory(self.last_version)?;
        let dirs = [
            self.module.build_directory.clone(),
            self.module.log_directory.clone(),
            Some(version_dir),
        ];
        for dir in dirs.into_iter().flatten() {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| io_error(&dir, source))?;
        }
        debug!(module = %self.module.name, last_version = self.last_version, "prepared");
        Ok(())
    }

    /// Stages the files, writes metadata and produces the archive.
    ///
    /// Empty directories are pruned before the metadata is written, so a
    /// build without staged files fails with `BuildError::NoChanges` and
    /// leaves no archive behind.
    ///
    /// # Errors
    ///
    /// Returns the first stage error, `BuildError::NoChanges`,
    /// `BuildError::DescriptionMissing` for a release without description,
    /// or an error if a file or the archive cannot be written.
    pub async fn collect(&mut self) -> Result<PathBuf> {
        let module = &self.module;
        let stages = module.build_stages(self.last_version).to_vec();
        let mode = if self.last_version {
            StageMode::LastVersion
        } else {
            StageMode::Release
        };
        handle_stages(&self.ctx, &stages, module, mode).await?;

        let version_dir = module.version_directory(self.last_version)?;
        let pruned = {
            let dir = version_dir.clone();
            tokio::task::spawn_blocking(move || -> Result<bool> {
                let removed = remove_empty_dirs(&dir)?;
                debug!(removed, dir = %dir.display(), "pruned empty directories");
                is_empty_dir(&dir)
            })
            .await??
        };
        if pruned {
            return Err(BuildError::NoChanges.into());
        }

        self.write_description(&version_dir).await?;
        if !self.last_version {
            let path = version_dir.join(VERSION_FILE);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| io_error(parent, source))?;
            }
            let content = version_php(&module.version, Local::now().naive_local());
            tokio::fs::write(&path, content)
                .await
                .map_err(|source| io_error(&path, source))?;
        }

        let archive = module.archive_path(self.last_version)?;
        self.archive = Some(archive.clone());
        let entries = {
            let dir = version_dir.clone();
            let archive = archive.clone();
            tokio::task::spawn_blocking(move || zip_it(&dir, &archive)).await??
        };
        self.ctx
            .logger()
            .info(&format!("archive {} written, {entries} entries", archive.display()));
        info!(archive = %archive.display(), entries, "module packed");
        Ok(archive)
    }

    async fn write_description(&self, version_dir: &Path) -> Result<()> {
        let module = Arc::clone(&self.module);
        let history = Arc::clone(self.ctx.history());
        let description =
            tokio::task::spawn_blocking(move || description_text(&module, history.as_ref()))
                .await?
                .unwrap_or_else(|err| {
                    warn!(error = format!("{err:#}"), "failed to render the commit log");
                    None
                });

        let path = version_dir.join(DESCRIPTION_FILE);
        match description {
            Some(text) => {
                tokio::fs::write(&path, to_windows_1251(&text))
                    .await
                    .map_err(|source| io_error(&path, source))?;
                Ok(())
            }
            None if self.last_version => Ok(()),
            // A stage may have copied the description itself.
            None => match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.len() > 0 => Ok(()),
                _ => Err(BuildError::DescriptionMissing.into()),
            },
        }
    }

    /// Removes the archive written by this builder, if any, and the version
    /// directory. Failures are logged.
    ///
    /// An archive left by an earlier build of the same version is kept.
    pub async fn rollback(&mut self) {
        if let Some(archive) = self.archive.take() {
            remove_quietly(&archive, false).await;
        }
        if let Ok(dir) = self.module.version_directory(self.last_version) {
            remove_quietly(&dir, true).await;
        }
    }

    /// Removes the version directory and releases the logger.
    pub async fn cleanup(&self) {
        if let Ok(dir) = self.module.version_directory(self.last_version) {
            remove_quietly(&dir, true).await;
        }
        self.ctx.logger().cleanup();
    }
}

async fn remove_quietly(path: &Path, dir: bool) {
    let result = if dir {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    match result {
        Ok(()) => debug!(path = %path.display(), "removed"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %path.display(), error = %err, "failed to remove"),
    }
}
