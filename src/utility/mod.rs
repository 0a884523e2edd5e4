// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Utility modules.
//!
//! ```text
//! encoding
//!   to_windows_1251()   UTF-8 --> Windows-1251
//!   needs_conversion()  lang/*.php, description.ru
//! fs
//!   walk:     path_processing(), FilterRules, Incremental
//!   copy:     CopyTask, copy_file()
//!   archive:  zip_it()
//!   remove_empty_dirs(), is_empty_dir()
//! ```

pub mod encoding;
pub mod fs;
