// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |        build / run / check / changelog
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |  config + module (YAML)   |
//!              |  settings, ModuleSpec     |
//!              '--+-----------+--------+---'
//!                 |           |        |
//!                 v           v        v
//!              builder      stage     git
//!            prepare/zip  orchestrator gix/CLI
//!                           |
//!                    +------+------+
//!                    v             v
//!                  hook        utility::fs
//!              command/http   walk/copy/zip
//!
//!   +-----------------------------------------+
//!   |  core   process builder and runner      |
//!   +-----------------------------------------+
//!   |  foundation   error, logging, encoding  |
//!   +-----------------------------------------+
//! ```

pub mod builder;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod core;
pub mod error;
pub mod git;
pub mod hook;
pub mod logging;
pub mod module;
pub mod stage;
pub mod utility;

#[cfg(test)]
mod test_utils;
