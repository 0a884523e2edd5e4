// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pre- and post-stage callbacks.
//!
//! ```text
//! CallbackAction --> Hook::new(stage, action)
//!                         |
//!                    run(HookContext)
//!                         |
//!                  validate_action()
//!                         |
//!             +-----------+-----------+
//!             v                       v
//!        CommandHook             ExternalHook
//!   ProcessBuilder + deadline   reqwest GET/POST
//!   kill on timeout             status must be 200
//! ```
//!
//! Every hook observes the context's cancellation token and deadline.

pub mod command;
pub mod external;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use futures_util::future::BoxFuture;
use regex::Regex;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{Result, SpecError};
use crate::module::{CallbackAction, CallbackKind};

pub use command::CommandHook;
pub use external::ExternalHook;

/// Deadline applied to a hook when none is configured.
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// Context provided to hooks during execution.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Cancellation token shared with the owning stage.
    cancel_token: CancellationToken,

    /// Deadline for a single hook invocation.
    timeout: Duration,

    /// Working directory for command hooks.
    cwd: Option<PathBuf>,
}

impl HookContext {
    /// Creates a context with the default 30 second deadline.
    #[must_use]
    pub const fn new(cancel_token: CancellationToken) -> Self {
        Self {
            cancel_token,
            timeout: DEFAULT_HOOK_TIMEOUT,
            cwd: None,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Checks if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// Something a stage can run before or after copying.
pub trait Runnable: Send + Sync {
    /// Short description for logs.
    fn describe(&self) -> String;

    /// Runs the action to completion, its deadline, or cancellation.
    ///
    /// # Errors
    ///
    /// Returns a `HookError` when the action fails, or a `SpecError` when
    /// the action does not pass validation.
    fn run<'a>(&'a self, ctx: &'a HookContext) -> BoxFuture<'a, Result<()>>;
}

/// A validated callback bound to its stage.
#[derive(Debug, Clone)]
pub struct Hook {
    stage: String,
    action: CallbackAction,
}

impl Hook {
    #[must_use]
    pub fn new(stage: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            stage: stage.into(),
            action,
        }
    }
}

impl Runnable for Hook {
    fn describe(&self) -> String {
        match self.action.kind {
            CallbackKind::Command => CommandHook::new(&self.action).describe(),
            CallbackKind::External => ExternalHook::new(&self.action).describe(),
        }
    }

    fn run<'a>(&'a self, ctx: &'a HookContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            validate_action(&self.stage, &self.action)?;
            match self.action.kind {
                CallbackKind::Command => CommandHook::new(&self.action).run(ctx).await,
                CallbackKind::External => ExternalHook::new(&self.action).run(ctx).await,
            }
        })
    }
}

/// Characters that would change the meaning of an argument in a shell.
fn unsafe_argument_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[;&|$`<>(){}\\\r\n\x00]").unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

/// Returns whether `arg` is free of shell metacharacters.
#[must_use]
pub fn is_safe_argument(arg: &str) -> bool {
    !unsafe_argument_regex().is_match(arg)
}

/// Checks a callback action before it is run.
///
/// Command actions must be non-empty and every token of the action plus
/// every parameter must be free of shell metacharacters. External actions
/// need an http(s) URL, a GET or POST method and `key=value` parameters.
///
/// # Errors
///
/// Returns the matching `SpecError` for the first violation found.
pub fn validate_action(stage: &str, action: &CallbackAction) -> Result<()> {
    match action.kind {
        CallbackKind::Command => validate_command(stage, action),
        CallbackKind::External => validate_external(stage, action),
    }
}

fn validate_command(stage: &str, action: &CallbackAction) -> Result<()> {
    if action.action.trim().is_empty() {
        return Err(SpecError::InvalidCallback {
            stage: stage.to_string(),
            message: "command action is empty".to_string(),
        }
        .into());
    }
    let tokens = action.action.split_whitespace();
    if let Some(arg) = tokens
        .chain(action.parameters.iter().map(String::as_str))
        .find(|arg| !is_safe_argument(arg))
    {
        return Err(SpecError::UnsafeArgument(arg.to_string()).into());
    }
    Ok(())
}

fn validate_external(stage: &str, action: &CallbackAction) -> Result<()> {
    let url = Url::parse(action.action.trim())
        .map_err(|_| SpecError::InvalidUrl(action.action.clone()))?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(SpecError::InvalidUrl(action.action.clone()).into());
    }

    let method = action.method.as_deref().unwrap_or_default();
    if !method.eq_ignore_ascii_case("get") && !method.eq_ignore_ascii_case("post") {
        return Err(SpecError::InvalidCallback {
            stage: stage.to_string(),
            message: format!("unsupported method '{method}', expected GET or POST"),
        }
        .into());
    }

    for parameter in &action.parameters {
        match parameter.split_once('=') {
            Some((key, value)) if !key.is_empty() && !value.is_empty() => {}
            _ => return Err(SpecError::InvalidParameter(parameter.clone()).into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
