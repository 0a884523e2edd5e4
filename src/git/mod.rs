// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git history module.
//!
//! ```text
//!          changelog.rs
//!   resolve_range  commit_list  changes_list
//!          \           |           /
//!           v          v          v
//!        ,--------------------------,
//!        |  GitHistory (trait, DI)  |
//!        '-----+--------------+-----'
//!              |              |
//!              v              v
//!         GixBackend     ShellBackend
//!       rev-parse, walk  rev-parse, log,
//!       (in-process)     diff -M (CLI)
//! ```

pub mod backend;
pub mod changelog;
