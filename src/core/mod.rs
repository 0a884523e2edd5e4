// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core runtime modules.
//!
//! ```text
//!     core
//!      |
//!   process
//!      |
//!   Builder --> Output
//! ```

pub mod process;
