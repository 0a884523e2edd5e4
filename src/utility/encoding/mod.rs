// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Windows-1251 conversion for language files.
//!
//! ```text
//! source bytes --(UTF-8 lossy)--> str --(encode)--> Windows-1251 bytes
//! ```
//!
//! Uses `encoding_rs`. Characters outside the code page become HTML
//! numeric character references, as `encoding_rs` does for legacy encoders.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::{Component, Path};

use encoding_rs::WINDOWS_1251;

/// File name that is always converted when conversion is enabled.
pub const DESCRIPTION_FILE: &str = "description.ru";

/// Language directory name whose `.php` files are converted.
const LANG_DIR: &str = "lang";

/// Encodes UTF-8 text as Windows-1251.
#[must_use]
pub fn to_windows_1251(text: &str) -> Cow<'_, [u8]> {
    let (bytes, _encoding, _had_unmappable) = WINDOWS_1251.encode(text);
    bytes
}

/// Transcodes raw UTF-8 file content to Windows-1251.
///
/// Invalid UTF-8 sequences are replaced with U+FFFD before encoding.
#[must_use]
pub fn transcode_to_1251(bytes: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(bytes);
    to_windows_1251(&text).into_owned()
}

/// Returns whether a file qualifies for Windows-1251 conversion.
///
/// Qualifying files are `.php` files below a `lang` directory and files named
/// exactly `description.ru`.
#[must_use]
pub fn needs_conversion(path: &Path) -> bool {
    if path.file_name().is_some_and(|name| name == DESCRIPTION_FILE) {
        return true;
    }
    let is_php = path.extension().is_some_and(|ext| ext == "php");
    is_php
        && path
            .parent()
            .is_some_and(|dir| {
                dir.components()
                    .any(|c| c == Component::Normal(OsStr::new(LANG_DIR)))
            })
}
