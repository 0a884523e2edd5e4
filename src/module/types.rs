// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Module specification sub-types.

use serde::{Deserialize, Serialize};

/// Overwrite policy for files that already exist at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileExistsAction {
    /// Always overwrite.
    #[default]
    Replace,
    /// Leave the existing file untouched.
    Skip,
    /// Overwrite only when the source is strictly newer.
    ReplaceIfNewer,
}

impl FileExistsAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Skip => "skip",
            Self::ReplaceIfNewer => "replace_if_newer",
        }
    }
}

/// A named unit of copy work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stage {
    pub name: String,
    /// Destination, relative to the version directory.
    pub to: String,
    /// Source paths.
    pub from: Vec<String>,
    /// Required; unset only in documents that fail validation.
    pub action_if_file_exists: Option<FileExistsAction>,
    /// Include globs, `!`-prefixed exclude globs.
    pub filter: Vec<String>,
    #[serde(rename = "convertTo1251")]
    pub convert_to_1251: bool,
}

impl Stage {
    /// Returns the effective overwrite policy.
    #[must_use]
    pub fn action(&self) -> FileExistsAction {
        self.action_if_file_exists.unwrap_or_default()
    }
}

/// Ordered stage lists for the two build flavours.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Builds {
    pub release: Vec<String>,
    pub last_version: Vec<String>,
}

/// Callback flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackKind {
    /// Local subprocess.
    Command,
    /// HTTP request.
    External,
}

/// One pre- or post-stage action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackAction {
    #[serde(rename = "type")]
    pub kind: CallbackKind,
    pub action: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// Hooks attached to a stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Callback {
    pub stage: String,
    pub pre: Option<CallbackAction>,
    pub post: Option<CallbackAction>,
}

/// How a changelog boundary is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionKind {
    Commit,
    Tag,
}

/// One side of the changelog range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Revision {
    #[serde(rename = "type")]
    pub kind: Option<RevisionKind>,
    pub value: String,
}

/// Commit ordering for release notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Whether matching commits are kept or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    Include,
    Exclude,
}

/// Commit subject filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: Option<ConditionKind>,
    pub value: Vec<String>,
}

impl Condition {
    #[must_use]
    pub const fn new(kind: ConditionKind, value: Vec<String>) -> Self {
        Self {
            kind: Some(kind),
            value,
        }
    }
}

/// Release-note line rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformKind {
    StripPrefix,
    StripSuffix,
    RemoveAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(rename = "type")]
    pub kind: TransformKind,
    #[serde(default)]
    pub value: Vec<String>,
}

/// Git range and release-note rendering rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Changelog {
    pub from: Revision,
    pub to: Revision,
    pub sort: Option<SortOrder>,
    pub condition: Condition,
    pub transform: Vec<Transform>,
    pub max_length: i64,
    pub footer_template: Option<String>,
}

impl Changelog {
    /// Both boundaries have a type; otherwise the changelog is disabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.from.kind.is_some() && self.to.kind.is_some()
    }
}

/// Release channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Alpha,
    Beta,
    Stable,
}

impl Label {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Stable => "stable",
        }
    }
}

/// Rotation period of the module log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    Never,
    Minutely,
    Hourly,
    Daily,
}

/// Module log rotation policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogPolicy {
    pub rotation: Rotation,
    pub max_files: Option<usize>,
}
