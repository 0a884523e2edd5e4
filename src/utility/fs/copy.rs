// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::walk::CopyTask;
use crate::error::{FsError, Result};
use crate::module::FileExistsAction;
use crate::utility::encoding::{needs_conversion, transcode_to_1251};
use std::path::Path;
use std::time::SystemTime;
use tokio::fs;
use tokio_util::sync::CancellationToken;

/// What [`copy_file`] did with a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Bytes copied verbatim.
    Copied,
    /// Content transcoded to Windows-1251.
    Converted,
    /// Destination kept by the overwrite policy.
    Skipped,
    /// Cancellation observed before writing.
    Cancelled,
}

fn io_error(path: &Path, source: std::io::Error) -> FsError {
    FsError::IoError {
        path: path.display().to_string(),
        source,
    }
}

async fn modified(path: &Path) -> Result<SystemTime> {
    let meta = fs::metadata(path).await.map_err(|e| io_error(path, e))?;
    Ok(meta.modified().map_err(|e| io_error(path, e))?)
}

/// Returns whether an existing destination must be overwritten under `action`.
async fn should_write(task: &CopyTask) -> Result<bool> {
    match task.action {
        FileExistsAction::Replace => Ok(true),
        FileExistsAction::Skip => Ok(false),
        FileExistsAction::ReplaceIfNewer => {
            Ok(modified(&task.from).await? > modified(&task.to).await?)
        }
    }
}

/// Copies one file, honoring the overwrite policy and optional conversion.
///
/// With `task.convert` set, `.php` files below a `lang` directory and
/// `description.ru` are transcoded to Windows-1251. The source modification
/// time is propagated to the destination.
///
/// # Errors
///
/// Returns an error if the source cannot be read or the destination written.
pub async fn copy_file(task: &CopyTask, cancel: &CancellationToken) -> Result<CopyOutcome> {
    if cancel.is_cancelled() {
        return Ok(CopyOutcome::Cancelled);
    }
    let exists = fs::try_exists(&task.to)
        .await
        .map_err(|e| io_error(&task.to, e))?;
    if exists && !should_write(task).await? {
        return Ok(CopyOutcome::Skipped);
    }

    let convert = task.convert && needs_conversion(&task.from);
    let mtime = modified(&task.from).await?;

    if cancel.is_cancelled() {
        return Ok(CopyOutcome::Cancelled);
    }
    // A read-only copy from an earlier stage cannot be opened for writing.
    if exists {
        fs::remove_file(&task.to)
            .await
            .map_err(|e| io_error(&task.to, e))?;
    }
    if convert {
        let content = fs::read(&task.from)
            .await
            .map_err(|e| io_error(&task.from, e))?;
        fs::write(&task.to, transcode_to_1251(&content))
            .await
            .map_err(|e| io_error(&task.to, e))?;
    } else {
        fs::copy(&task.from, &task.to)
            .await
            .map_err(|e| io_error(&task.to, e))?;
    }

    set_modified(&task.to, mtime).await?;
    Ok(if convert {
        CopyOutcome::Converted
    } else {
        CopyOutcome::Copied
    })
}

/// Sets the modification time of `path`.
///
/// `fs::copy` carries the source permissions over, so the destination may be
/// read-only. The owner can still update times through a read-only handle.
async fn set_modified(path: &Path, mtime: SystemTime) -> Result<()> {
    #[cfg(unix)]
    let file = fs::File::open(path).await;
    #[cfg(not(unix))]
    let file = fs::OpenOptions::new().write(true).open(path).await;

    let file = file.map_err(|e| io_error(path, e))?.into_std().await;
    file.set_modified(mtime).map_err(|e| io_error(path, e))?;
    Ok(())
}
