// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Changelog range resolution, commit filtering and change sets.
//!
//! ```text
//! Changelog{from,to} --resolve_range--> (start, end)
//!        |                                  |
//!        v                                  v
//!   commit_list                        changes_list
//!   walk end..start                    diff start end
//!   commit_filter                      classify by before/after
//!   sort asc|desc                      Added|Modified|Deleted|Moved
//!        |
//!        v
//!   render_notes (transform, trim, truncate, footer)
//! ```

use std::path::Path;

use regex::Regex;
use tracing::debug;

use super::backend::{FilePatch, GitHistory};
use crate::error::Result;
use crate::module::{Changelog, Condition, ConditionKind, Revision, RevisionKind, SortOrder};
use crate::module::{Transform, TransformKind};

/// Repository paths touched between the two changelog revisions.
///
/// Paths are relative to the repository root with `/` separators. Moved
/// entries hold the new path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    pub moved: Vec<String>,
}

impl Changes {
    /// Returns whether a file at `path` has content to ship: added, modified or moved.
    #[must_use]
    pub fn is_copyable(&self, path: &str) -> bool {
        [&self.added, &self.modified, &self.moved]
            .into_iter()
            .any(|list| list.iter().any(|p| p == path))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.moved.is_empty()
    }
}

fn resolve_side(history: &dyn GitHistory, repo: &Path, revision: &Revision) -> Result<String> {
    match revision.kind {
        Some(RevisionKind::Tag) => Ok(history.resolve_revision(repo, &revision.value)?),
        _ => Ok(revision.value.clone()),
    }
}

/// Resolves both changelog boundaries to commit hashes.
///
/// Commit boundaries are used verbatim; tags are resolved through `history`.
///
/// # Errors
///
/// Returns `GitError::RevisionNotFound` or `GitError::RepoNotFound` if a tag
/// cannot be resolved.
pub fn resolve_range(
    history: &dyn GitHistory,
    repo: &Path,
    changelog: &Changelog,
) -> Result<(String, String)> {
    let start = resolve_side(history, repo, &changelog.from)?;
    let end = resolve_side(history, repo, &changelog.to)?;
    Ok((start, end))
}

/// Returns the filtered and sorted commit subjects of the changelog range.
///
/// A changelog without both boundary types yields an empty list.
///
/// # Errors
///
/// Returns an error if the range cannot be resolved or walked.
pub fn commit_list(
    history: &dyn GitHistory,
    repo: &Path,
    changelog: &Changelog,
) -> Result<Vec<String>> {
    if !changelog.is_enabled() {
        return Ok(Vec::new());
    }
    let (start, end) = resolve_range(history, repo, changelog)?;
    let mut subjects: Vec<String> = history
        .commit_subjects(repo, &start, &end)?
        .into_iter()
        .filter(|subject| commit_filter(subject, &changelog.condition))
        .collect();

    match changelog.sort {
        Some(SortOrder::Asc) => subjects.sort(),
        Some(SortOrder::Desc) => subjects.sort_by(|a, b| b.cmp(a)),
        None => {}
    }
    debug!(commits = subjects.len(), %start, %end, "collected changelog commits");
    Ok(subjects)
}

/// Decides whether a commit subject passes the condition.
///
/// Regexes are tried in order. A regex that fails to compile ends the
/// evaluation as if nothing had matched.
#[must_use]
pub fn commit_filter(message: &str, condition: &Condition) -> bool {
    if condition.value.is_empty() {
        return true;
    }
    let include = !matches!(condition.kind, Some(ConditionKind::Exclude));
    for pattern in &condition.value {
        let Ok(re) = Regex::new(pattern) else {
            break;
        };
        if re.is_match(message) {
            return include;
        }
    }
    !include
}

/// Diffs the changelog range and classifies every touched path.
///
/// # Errors
///
/// Returns an error if the range cannot be resolved or diffed.
pub fn changes_list(
    history: &dyn GitHistory,
    repo: &Path,
    changelog: &Changelog,
) -> Result<Changes> {
    let (start, end) = resolve_range(history, repo, changelog)?;
    let changes = classify(history.diff(repo, &start, &end)?);
    debug!(
        added = changes.added.len(),
        modified = changes.modified.len(),
        deleted = changes.deleted.len(),
        moved = changes.moved.len(),
        "computed repository changes"
    );
    Ok(changes)
}

pub(crate) fn classify(patches: Vec<FilePatch>) -> Changes {
    let mut changes = Changes::default();
    for patch in patches {
        match (patch.before, patch.after) {
            (None, Some(after)) => changes.added.push(after),
            (Some(before), None) => changes.deleted.push(before),
            (Some(before), Some(after)) if before != after => changes.moved.push(after),
            (Some(_), Some(after)) => changes.modified.push(after),
            (None, None) => {}
        }
    }
    changes
}

fn apply_transform(line: &str, transform: &Transform) -> String {
    let mut line = line.to_string();
    for value in transform.value.iter().filter(|v| !v.is_empty()) {
        line = match transform.kind {
            TransformKind::StripPrefix => line.strip_prefix(value.as_str()).unwrap_or(&line).to_string(),
            TransformKind::StripSuffix => line.strip_suffix(value.as_str()).unwrap_or(&line).to_string(),
            TransformKind::RemoveAll => line.replace(value.as_str(), ""),
        };
    }
    line
}

/// Renders commit subjects as release notes.
///
/// Each subject runs through the transforms, is trimmed and, when
/// `maxLength > 0`, truncated to that many characters. Empty lines are
/// dropped. The footer is appended only when at least one line remains.
#[must_use]
pub fn render_notes(changelog: &Changelog, subjects: &[String], footer: Option<&str>) -> String {
    let max_length = usize::try_from(changelog.max_length).unwrap_or(0);
    let lines: Vec<String> = subjects
        .iter()
        .map(|subject| {
            let line = changelog
                .transform
                .iter()
                .fold(subject.clone(), |line, t| apply_transform(&line, t));
            let line = line.trim();
            if max_length > 0 {
                line.chars().take(max_length).collect::<String>().trim_end().to_string()
            } else {
                line.to_string()
            }
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return String::new();
    }
    let mut notes = lines
        .iter()
        .map(|line| format!("- {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    if let Some(footer) = footer.map(str::trim).filter(|f| !f.is_empty()) {
        notes.push_str("\n\n");
        notes.push_str(footer);
    }
    notes
}
