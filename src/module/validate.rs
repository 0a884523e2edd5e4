// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Structural validation of a [`ModuleSpec`].

use std::collections::HashSet;

use regex::Regex;
use wax::Glob;

use super::{Changelog, ModuleSpec, RevisionKind, Stage};
use crate::error::{Result, SpecError};
use crate::hook::validate_action;

impl ModuleSpec {
    /// Checks every invariant of the specification.
    ///
    /// # Errors
    ///
    /// Returns the first [`SpecError`] found.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(missing("name"));
        }
        if self.version.trim().is_empty() {
            return Err(missing("version"));
        }

        let mut names = HashSet::new();
        for stage in &self.stages {
            validate_stage(&self.expand_stage(stage))?;
            if !names.insert(stage.name.as_str()) {
                return Err(SpecError::DuplicateStage {
                    list: "stages".to_string(),
                    stage: stage.name.clone(),
                }
                .into());
            }
        }

        self.validate_list("builds.release", &self.builds.release)?;
        self.validate_list("builds.lastVersion", &self.builds.last_version)?;
        for (command, list) in &self.run {
            self.validate_list(&format!("run.{command}"), list)?;
        }

        for callback in &self.callbacks {
            if !names.contains(callback.stage.as_str()) {
                return Err(SpecError::UnknownStage {
                    list: "callbacks".to_string(),
                    stage: callback.stage.clone(),
                }
                .into());
            }
            for action in callback.pre.iter().chain(callback.post.iter()) {
                validate_action(&callback.stage, &self.expand_action(action))?;
            }
        }

        for pattern in &self.ignore {
            validate_glob(pattern)?;
        }

        if has_any_side(&self.changelog) {
            validate_changelog(&self.changelog)?;
        }
        Ok(())
    }

    fn validate_list(&self, list: &str, stages: &[String]) -> Result<()> {
        let mut seen = HashSet::new();
        for name in stages {
            if !self.stages.iter().any(|s| &s.name == name) {
                return Err(SpecError::UnknownStage {
                    list: list.to_string(),
                    stage: name.clone(),
                }
                .into());
            }
            if !seen.insert(name.as_str()) {
                return Err(SpecError::DuplicateStage {
                    list: list.to_string(),
                    stage: name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}

fn missing(field: &str) -> anyhow::Error {
    SpecError::MissingField {
        field: field.to_string(),
    }
    .into()
}

fn validate_stage(stage: &Stage) -> Result<()> {
    let invalid = |message: &str| -> anyhow::Error {
        SpecError::InvalidStage {
            stage: stage.name.clone(),
            message: message.to_string(),
        }
        .into()
    };

    if stage.name.trim().is_empty() {
        return Err(missing("stages[].name"));
    }
    if stage.to.trim().is_empty() {
        return Err(invalid("'to' is empty"));
    }
    if stage.from.is_empty() {
        return Err(invalid("'from' is empty"));
    }
    if stage.from.iter().any(|f| f.trim().is_empty()) {
        return Err(invalid("'from' contains an empty path"));
    }
    if stage.action_if_file_exists.is_none() {
        return Err(invalid("'actionIfFileExists' is not set"));
    }
    for pattern in &stage.filter {
        validate_glob(pattern.strip_prefix('!').unwrap_or(pattern))?;
    }
    Ok(())
}

fn validate_glob(pattern: &str) -> Result<()> {
    Glob::new(pattern).map(|_| ()).map_err(|e| {
        SpecError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

const fn has_any_side(changelog: &Changelog) -> bool {
    changelog.from.kind.is_some() || changelog.to.kind.is_some()
}

fn validate_changelog(changelog: &Changelog) -> Result<()> {
    for (side, revision) in [("from", &changelog.from), ("to", &changelog.to)] {
        if revision.kind.is_none() {
            return Err(SpecError::InvalidChangelog(format!(
                "'{side}.type' must be one of commit, tag"
            ))
            .into());
        }
        if revision.value.trim().is_empty() {
            return Err(SpecError::InvalidChangelog(format!("'{side}.value' is empty")).into());
        }
        if matches!(revision.kind, Some(RevisionKind::Commit))
            && revision.value.chars().any(char::is_whitespace)
        {
            return Err(SpecError::InvalidChangelog(format!(
                "'{side}.value' is not a commit hash"
            ))
            .into());
        }
    }
    for pattern in &changelog.condition.value {
        Regex::new(pattern).map_err(|e| SpecError::InvalidRegex {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
    }
    if changelog.max_length < 0 {
        return Err(
            SpecError::InvalidChangelog("'maxLength' must not be negative".to_string()).into(),
        );
    }
    Ok(())
}
