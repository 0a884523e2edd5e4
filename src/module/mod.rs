// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Module specification data model.
//!
//! ```text
//! module.yaml --(serde_yaml)--> ModuleSpec
//!                                 |
//!        with_version / with_description / with_repository
//!                                 |
//!                             validate()
//!                                 |
//!        stage(name) --> {key} expansion (<= 5 levels) --> Stage
//!        changes(history) --> ChangesCache (compute once)
//! ```

pub mod types;
mod validate;


use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result, SpecError};
use crate::git::backend::GitHistory;
use crate::git::changelog::{Changes, changes_list};

pub use types::{
    Builds, Callback, CallbackAction, CallbackKind, Changelog, Condition, ConditionKind,
    FileExistsAction, Label, LogPolicy, Revision, RevisionKind, Rotation, SortOrder, Stage,
    Transform, TransformKind,
};

/// Version directory name used by "last version" builds.
pub const LAST_VERSION_DIR: &str = ".last_version";

/// Maximum nesting depth of `{key}` variable references.
const MAX_EXPANSION_DEPTH: usize = 5;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z0-9_.\-]+)\}").unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

/// Declarative description of a packaged module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModuleSpec {
    pub name: String,
    pub version: String,
    pub account: String,
    pub repository: Option<PathBuf>,
    pub build_directory: Option<PathBuf>,
    pub log_directory: Option<PathBuf>,
    pub variables: BTreeMap<String, String>,
    pub stages: Vec<Stage>,
    pub builds: Builds,
    pub run: BTreeMap<String, Vec<String>>,
    pub callbacks: Vec<Callback>,
    pub changelog: Changelog,
    pub ignore: Vec<String>,
    pub label: Option<Label>,
    pub description: Option<String>,
    pub log: LogPolicy,
    #[serde(skip)]
    changes: ChangesCache,
}

impl ModuleSpec {
    /// Parses a module specification from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `SpecError::Parse` if the document is not a valid specification.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| {
            SpecError::Parse {
                path: "<string>".to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Loads a module specification from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_yaml::from_str(&content).map_err(|e| {
            SpecError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Overrides the module version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Overrides the release description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides the repository path and drops any cached changes.
    #[must_use]
    pub fn with_repository(mut self, repository: impl Into<PathBuf>) -> Self {
        self.repository = Some(repository.into());
        self.changes = ChangesCache::default();
        self
    }

    /// Expands `{key}` placeholders from `variables` and the built-ins
    /// `name`, `version` and `account`.
    ///
    /// Nested references are followed up to five levels; unknown keys are
    /// left verbatim.
    #[must_use]
    pub fn expand(&self, input: &str) -> String {
        let mut current = input.to_string();
        for _ in 0..MAX_EXPANSION_DEPTH {
            let next = placeholder_regex()
                .replace_all(&current, |caps: &regex::Captures<'_>| {
                    self.variable(&caps[1])
                        .map_or_else(|| caps[0].to_string(), str::to_string)
                })
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn variable(&self, key: &str) -> Option<&str> {
        match key {
            "name" if !self.variables.contains_key(key) => Some(&self.name),
            "version" if !self.variables.contains_key(key) => Some(&self.version),
            "account" if !self.variables.contains_key(key) => Some(&self.account),
            _ => self.variables.get(key).map(String::as_str),
        }
    }

    /// Returns the stage definition with variables expanded.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<Stage> {
        self.stages
            .iter()
            .find(|s| s.name == name)
            .map(|s| self.expand_stage(s))
    }

    fn expand_stage(&self, stage: &Stage) -> Stage {
        Stage {
            name: stage.name.clone(),
            to: self.expand(&stage.to),
            from: stage.from.iter().map(|f| self.expand(f)).collect(),
            action_if_file_exists: stage.action_if_file_exists,
            filter: stage.filter.iter().map(|f| self.expand(f)).collect(),
            convert_to_1251: stage.convert_to_1251,
        }
    }

    /// Returns the callbacks attached to a stage with variables expanded.
    #[must_use]
    pub fn callback(&self, stage: &str) -> Option<Callback> {
        self.callbacks
            .iter()
            .find(|c| c.stage == stage)
            .map(|c| Callback {
                stage: c.stage.clone(),
                pre: c.pre.as_ref().map(|a| self.expand_action(a)),
                post: c.post.as_ref().map(|a| self.expand_action(a)),
            })
    }

    fn expand_action(&self, action: &CallbackAction) -> CallbackAction {
        CallbackAction {
            kind: action.kind,
            action: self.expand(&action.action),
            method: action.method.clone(),
            parameters: action.parameters.iter().map(|p| self.expand(p)).collect(),
        }
    }

    /// Returns the stage names of the selected build flavour.
    #[must_use]
    pub fn build_stages(&self, last_version: bool) -> &[String] {
        if last_version {
            &self.builds.last_version
        } else {
            &self.builds.release
        }
    }

    /// Returns `{buildDirectory}/{version}` or `{buildDirectory}/.last_version`.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::BuildDirectoryUnset` if no build directory is configured.
    pub fn version_directory(&self, last_version: bool) -> Result<PathBuf> {
        let build_dir = self
            .build_directory
            .as_ref()
            .ok_or(BuildError::BuildDirectoryUnset)?;
        Ok(build_dir.join(if last_version {
            LAST_VERSION_DIR
        } else {
            &self.version
        }))
    }

    /// Returns the archive path next to the version directory.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::BuildDirectoryUnset` if no build directory is configured.
    pub fn archive_path(&self, last_version: bool) -> Result<PathBuf> {
        let dir = self.version_directory(last_version)?;
        let mut name = dir.file_name().unwrap_or_default().to_os_string();
        name.push(".zip");
        Ok(dir.with_file_name(name))
    }

    /// Returns the repository changes of the changelog range, computed once.
    ///
    /// Returns `None` when the module has no repository or the changelog is
    /// disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the revisions cannot be resolved or diffed.
    pub fn changes(&self, history: &dyn GitHistory) -> Result<Option<Arc<Changes>>> {
        let Some(repository) = self.repository.as_deref() else {
            return Ok(None);
        };
        if !self.changelog.is_enabled() {
            return Ok(None);
        }
        self.changes
            .get_or_try_init(|| changes_list(history, repository, &self.changelog))
            .map(Some)
    }
}

/// Compute-once holder for the module's repository changes.
#[derive(Debug, Default)]
pub struct ChangesCache {
    inner: Mutex<Option<Arc<Changes>>>,
}

impl ChangesCache {
    /// Returns the cached value, running `init` under the lock on first use.
    ///
    /// A failed `init` leaves the cache empty.
    ///
    /// # Errors
    ///
    /// Returns the error of `init`, or an error if the lock is poisoned.
    pub fn get_or_try_init(&self, init: impl FnOnce() -> Result<Changes>) -> Result<Arc<Changes>> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("changes cache poisoned"))?;
        if let Some(changes) = guard.as_ref() {
            return Ok(Arc::clone(changes));
        }
        let changes = Arc::new(init()?);
        *guard = Some(Arc::clone(&changes));
        Ok(changes)
    }

    /// Returns the cached value without computing it.
    #[must_use]
    pub fn get(&self) -> Option<Arc<Changes>> {
        self.inner.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Clone for ChangesCache {
    fn clone(&self) -> Self {
        Self {
            inner: Mutex::new(self.get()),
        }
    }
}
