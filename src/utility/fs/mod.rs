// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem side of staging: walk, copy, prune and archive.
//!
//! ```text
//! walk:    path_processing()  ignore::WalkBuilder + wax globs --> CopyTask queue
//!          FilterRules        ignore, include / !exclude globs
//! copy:    copy_file()        overwrite policy, Windows-1251, mtime
//! archive: zip_it()           <basename>/... entries, empty dirs kept
//! prune:   remove_empty_dirs() bottom-up, root kept
//! ```

pub mod archive;
pub mod copy;
pub mod walk;


use crate::error::{FsError, Result};
use std::path::Path;

/// Removes every empty directory below `root`, deepest first.
///
/// `root` itself is kept. Returns the number of removed directories.
///
/// # Errors
///
/// Returns an error if a directory cannot be read or removed.
pub fn remove_empty_dirs(root: &Path) -> Result<usize> {
    fn prune(dir: &Path) -> Result<(usize, bool)> {
        let mut removed = 0;
        let mut empty = true;
        let entries = std::fs::read_dir(dir).map_err(|source| FsError::IoError {
            path: dir.display().to_string(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| FsError::IoError {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if entry.file_type().is_ok_and(|ft| ft.is_dir()) {
                let (count, child_empty) = prune(&path)?;
                removed += count;
                if child_empty {
                    std::fs::remove_dir(&path).map_err(|source| FsError::IoError {
                        path: path.display().to_string(),
                        source,
                    })?;
                    removed += 1;
                    continue;
                }
            }
            empty = false;
        }
        Ok((removed, empty))
    }

    if !root.is_dir() {
        return Ok(0);
    }
    Ok(prune(root)?.0)
}

/// Returns whether `dir` is missing or has no entries.
///
/// # Errors
///
/// Returns an error if `dir` exists but cannot be read.
pub fn is_empty_dir(dir: &Path) -> Result<bool> {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => Ok(entries.next().is_none()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
        Err(source) => Err(FsError::IoError {
            path: dir.display().to_string(),
            source,
        }
        .into()),
    }
}
