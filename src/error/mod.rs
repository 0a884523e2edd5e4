// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!             ModpackError (~24 bytes)
//!                     |
//!   +------+------+------+------+------+------+
//!   |      |      |      |      |      |      |
//!   v      v      v      v      v      v      v
//!  Spec   Git    Hook   Fs   Build   Io   Other
//!  Box    Box    Box    Box   Box    Box  Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Spec   UnknownStage, DuplicateStage, InvalidGlob, UnsafeArgument
//!   Git    RepoNotFound, RevisionNotFound, CommandFailed
//!   Hook   HttpStatus, Request, NonZeroExit, Kill
//!   Fs     NotFound, IoError
//!   Build  Stage, NoChanges, DescriptionMissing, Cancelled
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`ModpackError`].
pub type ModpackResult<T> = std::result::Result<T, ModpackError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum ModpackError {
    /// Module specification is invalid.
    #[error("specification error: {0}")]
    Spec(#[from] Box<SpecError>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Stage callback failed.
    #[error("hook error: {0}")]
    Hook(#[from] Box<HookError>),

    /// Filesystem error.
    #[error("filesystem error: {0}")]
    Fs(#[from] Box<FsError>),

    /// Build lifecycle error.
    #[error("build error: {0}")]
    Build(#[from] Box<BuildError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for ModpackError {
                fn from(err: $error) -> Self {
                    ModpackError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    SpecError => Spec,
    GitError => Git,
    HookError => Hook,
    FsError => Fs,
    BuildError => Build,
    std::io::Error => Io,
}

// --- Specification Errors ---

/// Module specification errors, detected at validation time and never retried.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A required field is missing or empty.
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// A build or run list references a stage that does not exist.
    #[error("stage '{stage}' referenced in '{list}' is not defined")]
    UnknownStage { list: String, stage: String },

    /// A stage name appears twice in one list.
    #[error("stage '{stage}' is listed more than once in '{list}'")]
    DuplicateStage { list: String, stage: String },

    /// A stage definition violates its invariants.
    #[error("invalid stage '{stage}': {message}")]
    InvalidStage { stage: String, message: String },

    /// A callback definition is invalid.
    #[error("invalid callback for stage '{stage}': {message}")]
    InvalidCallback { stage: String, message: String },

    /// The changelog definition is invalid.
    #[error("invalid changelog: {0}")]
    InvalidChangelog(String),

    /// A glob pattern failed to compile.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// A regular expression failed to compile.
    #[error("invalid regex '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    /// A callback URL is not an http(s) URL.
    #[error("invalid url '{0}'")]
    InvalidUrl(String),

    /// A command argument contains shell metacharacters.
    #[error("unsafe command argument '{0}'")]
    UnsafeArgument(String),

    /// An external parameter is not `key=value`.
    #[error("invalid parameter '{0}', expected key=value")]
    InvalidParameter(String),

    /// The specification document could not be parsed.
    #[error("failed to parse module specification '{path}': {message}")]
    Parse { path: String, message: String },
}

// --- Git Errors ---

/// Repository errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found at the specified path.
    #[error("repository not found: {path}")]
    RepoNotFound { path: String },

    /// A tag or commit could not be resolved.
    #[error("revision not found: {revision}")]
    RevisionNotFound { revision: String },

    /// Git command execution failed.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// Walking commit history failed.
    #[error("failed to walk history: {0}")]
    Walk(String),
}

// --- Hook Errors ---

/// Stage callback errors.
#[derive(Debug, Error)]
pub enum HookError {
    /// External callback answered with a status other than 200.
    #[error("callback {url} answered with status {status}")]
    HttpStatus { status: u16, url: String },

    /// External callback request failed.
    #[error("callback request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Command callback could not be started.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Command callback exited unsuccessfully.
    #[error("'{command}' exited with code {code}")]
    NonZeroExit { command: String, code: i32 },

    /// Command callback could not be stopped after its deadline.
    #[error("failed to stop '{command}': {source}")]
    Kill {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Filesystem Errors ---

/// Filesystem operation errors.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path not found.
    #[error("path not found: {0}")]
    NotFound(String),

    /// General I/O error.
    #[error("I/O error on '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Build Errors ---

/// Build lifecycle errors and domain sentinels.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A stage failed; wraps the underlying hook or copy error.
    #[error("stage '{stage}' failed")]
    Stage {
        stage: String,
        #[source]
        source: anyhow::Error,
    },

    /// The staged version directory is empty.
    #[error("no changes to package")]
    NoChanges,

    /// A release build has no description source.
    #[error("description.ru is missing or empty")]
    DescriptionMissing,

    /// The build was cancelled before completion.
    #[error("build cancelled")]
    Cancelled,

    /// The module has no build directory.
    #[error("build directory is not set")]
    BuildDirectoryUnset,

    /// One or more stages reference missing source paths.
    #[error("stage check failed:\n{}", errors.join("\n"))]
    StageCheck { errors: Vec<String> },
}

impl BuildError {
    /// Returns whether `err` carries the given build sentinel anywhere in its chain.
    #[must_use]
    pub fn matches(err: &anyhow::Error, predicate: impl Fn(&Self) -> bool) -> bool {
        err.chain().any(|cause| {
            cause.downcast_ref::<Self>().is_some_and(&predicate)
                || cause
                    .downcast_ref::<ModpackError>()
                    .is_some_and(|e| matches!(e, ModpackError::Build(b) if predicate(b)))
        })
    }

    /// Returns whether `err` is the "no changes" sentinel.
    #[must_use]
    pub fn is_no_changes(err: &anyhow::Error) -> bool {
        Self::matches(err, |e| matches!(e, Self::NoChanges))
    }

    /// Returns whether `err` is the "description missing" sentinel.
    #[must_use]
    pub fn is_description_missing(err: &anyhow::Error) -> bool {
        Self::matches(err, |e| matches!(e, Self::DescriptionMissing))
    }
}
