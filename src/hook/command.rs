// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Local subprocess callbacks.
//!
//! The action is split on whitespace: the first token is the program,
//! resolved through PATH, and the remaining tokens followed by the
//! parameters are passed as arguments. No shell is involved.

use futures_util::future::BoxFuture;
use tracing::{info, warn};

use super::{HookContext, Runnable};
use crate::core::process::builder::ProcessBuilder;
use crate::error::{BuildError, Result};
use crate::module::CallbackAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHook {
    program: String,
    args: Vec<String>,
}

impl CommandHook {
    #[must_use]
    pub fn new(action: &CallbackAction) -> Self {
        let mut tokens = action.action.split_whitespace().map(str::to_string);
        let program = tokens.next().unwrap_or_default();
        let args = tokens.chain(action.parameters.iter().cloned()).collect();
        Self { program, args }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn builder(&self, ctx: &HookContext) -> ProcessBuilder {
        let builder = ProcessBuilder::which(&self.program)
            .args(&self.args)
            .name(self.program.clone())
            .timeout(ctx.timeout());
        match ctx.cwd() {
            Some(cwd) => builder.cwd(cwd),
            None => builder,
        }
    }
}

impl Runnable for CommandHook {
    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn run<'a>(&'a self, ctx: &'a HookContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let builder = self.builder(ctx);
            let command = builder.command_line();
            info!(command = %command, "running command hook");

            let output = builder
                .run_with_cancellation(ctx.cancel_token().clone())
                .await?;
            if output.is_interrupted() {
                return Err(BuildError::Cancelled.into());
            }
            if output.is_timed_out() {
                warn!(
                    command = %command,
                    timeout_secs = ctx.timeout().as_secs_f64(),
                    "command hook stopped at its deadline"
                );
            }
            Ok(())
        })
    }
}
