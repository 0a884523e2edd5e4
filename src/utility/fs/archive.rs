// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{FsError, Result};
use anyhow::Context;
use ignore::WalkBuilder;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Archives `dir` into `archive`, rooting every entry under the directory's
/// base name.
///
/// Empty directories are kept as explicit directory entries. Entries are
/// written in file-name order.
///
/// Returns the number of file entries written.
///
/// # Errors
///
/// Returns an error if `dir` does not exist or the archive cannot be written.
pub fn zip_it(dir: &Path, archive: &Path) -> Result<usize> {
    let base = dir
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| FsError::NotFound(dir.display().to_string()))?;
    if !dir.is_dir() {
        return Err(FsError::NotFound(dir.display().to_string()).into());
    }

    let file = File::create(archive)
        .with_context(|| format!("failed to create archive {}", archive.display()))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut walker = WalkBuilder::new(dir);
    walker
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    let mut files = 0;
    for entry in walker.build() {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let mut name = base.to_string();
        for part in relative {
            name.push('/');
            name.push_str(&part.to_string_lossy());
        }

        if entry.file_type().is_some_and(|ft| ft.is_dir()) {
            writer
                .add_directory(name, options)
                .with_context(|| format!("failed to add directory {}", entry.path().display()))?;
        } else {
            writer
                .start_file(name, options)
                .with_context(|| format!("failed to add file {}", entry.path().display()))?;
            let mut source = File::open(entry.path())
                .with_context(|| format!("failed to open {}", entry.path().display()))?;
            std::io::copy(&mut source, &mut writer)
                .with_context(|| format!("failed to compress {}", entry.path().display()))?;
            files += 1;
        }
    }

    writer
        .finish()
        .with_context(|| format!("failed to finalize archive {}", archive.display()))?;
    debug!(archive = %archive.display(), files, "archive written");
    Ok(files)
}
