// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{FilePatch, GitHistory, GixBackend, ShellBackend, parse_name_status};
use crate::error::{GitError, ModpackError};
use crate::test_utils::{TestRepo, temp_dir};

fn linear_repo() -> (TestRepo, String, String) {
    let repo = TestRepo::new();
    repo.write("a.txt", "a");
    let first = repo.commit("feat: first");
    repo.tag("v1.0.0");
    repo.write("b.txt", "b");
    repo.commit("fix: second");
    repo.write("c.txt", "c");
    let third = repo.commit("feat: third\n\nbody line");
    (repo, first, third)
}

#[test]
fn test_backends_agree_on_tag_resolution() {
    let (repo, first, _) = linear_repo();
    assert_eq!(GixBackend.resolve_revision(repo.path(), "v1.0.0").unwrap(), first);
    assert_eq!(ShellBackend.resolve_revision(repo.path(), "v1.0.0").unwrap(), first);
}

#[test]
fn test_resolve_unknown_revision() {
    let (repo, _, _) = linear_repo();
    let err = GixBackend.resolve_revision(repo.path(), "v9.9.9").unwrap_err();
    assert!(matches!(
        err,
        ModpackError::Git(ref e) if matches!(**e, GitError::RevisionNotFound { .. })
    ));
}

#[test]
fn test_resolve_outside_repository() {
    let temp = temp_dir();
    let err = GixBackend.resolve_revision(temp.path(), "HEAD").unwrap_err();
    assert!(matches!(
        err,
        ModpackError::Git(ref e) if matches!(**e, GitError::RepoNotFound { .. })
    ));
}

#[test]
fn test_commit_subjects_excludes_start() {
    let (repo, first, third) = linear_repo();
    let expected = vec!["feat: third".to_string(), "fix: second".to_string()];
    assert_eq!(
        GixBackend.commit_subjects(repo.path(), &first, &third).unwrap(),
        expected
    );
    assert_eq!(
        ShellBackend.commit_subjects(repo.path(), &first, &third).unwrap(),
        expected
    );
}

#[test]
fn test_diff_detects_rename() {
    let repo = TestRepo::new();
    repo.write("keep.txt", "keep");
    repo.write("old.txt", "some reasonably long content so rename detection works\n");
    repo.write("gone.txt", "gone");
    let start = repo.commit("initial");

    repo.git(&["mv", "old.txt", "new.txt"]);
    repo.git(&["rm", "--quiet", "gone.txt"]);
    repo.write("keep.txt", "changed");
    repo.write("added.txt", "added");
    let end = repo.commit("second");

    let mut patches = GixBackend.diff(repo.path(), &start, &end).unwrap();
    patches.sort_by(|a, b| a.after.cmp(&b.after).then(a.before.cmp(&b.before)));
    assert_eq!(
        patches,
        vec![
            FilePatch::new(Some("gone.txt".into()), None),
            FilePatch::new(None, Some("added.txt".into())),
            FilePatch::new(Some("keep.txt".into()), Some("keep.txt".into())),
            FilePatch::new(Some("old.txt".into()), Some("new.txt".into())),
        ]
    );
}

#[test]
fn test_diff_unknown_revision_resolved_in_process() {
    let (repo, first, _) = linear_repo();
    let err = GixBackend.diff(repo.path(), &first, "v9.9.9").unwrap_err();
    assert!(matches!(
        err,
        ModpackError::Git(ref e)
            if matches!(&**e, GitError::RevisionNotFound { revision } if revision == "v9.9.9")
    ));
}

#[test]
fn test_parse_name_status() {
    let output = "M\0src/a.php\0R087\0old.php\0new.php\0A\0lang/ru.php\0D\0x.txt\0";
    let patches = parse_name_status(output).unwrap();
    assert_eq!(patches.len(), 4);
    assert_eq!(
        patches[1],
        FilePatch::new(Some("old.php".into()), Some("new.php".into()))
    );
    assert_eq!(patches[2], FilePatch::new(None, Some("lang/ru.php".into())));
}

#[test]
fn test_parse_name_status_truncated() {
    assert!(parse_name_status("R100\0only-one.php").is_err());
}
