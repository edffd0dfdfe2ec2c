// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::store_with;

use anyhow::Result;
use pretty_assertions::assert_eq;
use repolink::store::{FileSystem, PruneTargets};
use std::fs::create_dir;

#[test]
fn prune_removes_missing_and_orphaned_entries() -> Result<()> {
    let root = tempfile::tempdir()?;
    let repo1 = root.path().join("repo1");
    let repo2 = root.path().join("repo2");
    let repo3 = root.path().join("repo3");
    create_dir(&repo1)?;
    create_dir(&repo3)?;

    let mut store = store_with(
        &["g1", "g2"],
        &[("repo1", &repo1), ("repo2", &repo2), ("repo3", &repo3)],
        &[("g1", "repo1")],
    );

    let report = store.prune(&FileSystem)?;
    assert_eq!(report.missing, vec!["repo2"]);
    assert_eq!(
        report.orphans,
        PruneTargets {
            repositories: vec!["repo3".into()],
            groups: vec!["g2".into()],
        }
    );

    assert!(store.has_repository("repo1"));
    assert!(store.has_group("g1"));
    assert!(!store.has_repository("repo2"));
    assert!(!store.has_repository("repo3"));
    assert!(!store.has_group("g2"));
    assert!(store.has_relation("g1", "repo1"));

    Ok(())
}

#[test]
fn prune_targets_are_computed_after_missing_paths_cascade() -> Result<()> {
    let root = tempfile::tempdir()?;
    let kept = root.path().join("kept");
    let gone = root.path().join("gone");
    create_dir(&kept)?;

    let mut store = store_with(
        &["solo", "shared"],
        &[("kept", &kept), ("gone", &gone)],
        &[("solo", "gone"), ("shared", "gone"), ("shared", "kept")],
    );
    assert!(store.prune_targets().is_empty());

    let report = store.prune(&FileSystem)?;
    assert_eq!(report.missing, vec!["gone"]);
    assert_eq!(report.orphans.groups, vec!["solo"]);
    assert!(store.has_group("shared"));
    assert_eq!(store.relations_of_group("shared"), vec!["kept"]);

    Ok(())
}
