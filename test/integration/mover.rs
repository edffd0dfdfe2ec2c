// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::store_with;

use pretty_assertions::assert_eq;
use repolink::{
    mover::{execute, perform, plan, resolve, ExecutionKind, MoveError, TargetKind},
    Database, Store, StoreError, StoreOptions,
};
use std::path::Path;

fn fixture() -> Store {
    let src = Path::new("/src");
    store_with(
        &["groupA", "group1", "group2", "group3"],
        &[
            ("repo1", &src.join("repo1")),
            ("repo2", &src.join("repo2")),
            ("repo3", &src.join("repo3")),
        ],
        &[
            ("groupA", "repo1"),
            ("group1", "repo1"),
            ("group1", "repo2"),
            ("group2", "repo3"),
        ],
    )
}

#[test]
fn pair_to_unregistered_name_plans_repositories_to_group() {
    let store = fixture();
    let froms = vec![resolve("groupA/repo1", &store)];
    let to = resolve("repo5", &store);

    assert_eq!(to.kind, TargetKind::GroupOrRepo);
    assert_eq!(plan(&froms, &to), Ok(ExecutionKind::RepositoriesToGroup));
}

#[test]
fn several_groups_plan_groups_to_group() {
    let store = fixture();
    let froms = vec![resolve("group1", &store), resolve("group2", &store)];
    let to = resolve("group3", &store);

    assert_eq!(plan(&froms, &to), Ok(ExecutionKind::GroupsToGroup));
}

#[test]
fn move_pair_to_group_relinks_repository() {
    let mut store = fixture();
    store.unrelate("groupA", "repo1");

    let kind = perform(&mut store, ["group1/repo1"], "group3").unwrap();
    assert_eq!(kind, ExecutionKind::RepositoriesToGroup);
    assert!(store.has_relation("group3", "repo1"));
    assert!(!store.has_relation("group1", "repo1"));
}

#[test]
fn forced_invalid_kind_yields_exactly_one_error() {
    let mut store = fixture();
    let froms = vec![resolve("group1", &store)];
    let to = resolve("group3", &store);

    let failures = execute(&mut store, &froms, &to, ExecutionKind::Invalid).unwrap_err();
    assert_eq!(failures.len(), 1);
}

#[test]
fn move_into_missing_group_fails_without_auto_create() {
    let database = fixture().into_database();
    let mut store = Store::new(
        database,
        StoreOptions {
            auto_create_group: false,
        },
    );
    let before = store.database().clone();

    let failures = perform(&mut store, ["group1/repo1", "group1/repo2"], "fresh").unwrap_err();
    assert_eq!(failures.len(), 2);
    for error in &failures {
        assert_eq!(
            error,
            &MoveError::Store(StoreError::GroupNotFound {
                name: "fresh".into()
            })
        );
    }
    assert_eq!(store.database(), &before);
}

#[test]
fn move_repository_to_repository_requires_matching_name() {
    let mut store = fixture();
    let failures = perform(&mut store, ["group1/repo1"], "group2/repo3").unwrap_err();
    assert_eq!(failures.len(), 1);
    assert!(store.has_relation("group1", "repo1"));
    assert!(!store.has_relation("group2", "repo1"));

    let kind = perform(&mut store, ["group1/repo1"], "group2/repo1").unwrap();
    assert_eq!(kind, ExecutionKind::RepositoryToRepository);
    assert!(store.has_relation("group2", "repo1"));
    assert!(!store.has_relation("group1", "repo1"));
}

#[test]
fn ambiguous_source_is_reported_before_planning() {
    let mut store = Store::new(Database::default(), StoreOptions::default());
    store.create_group("dual", None, false).unwrap();
    store
        .create_repository("dual", "/src/dual", None, Vec::new())
        .unwrap();

    let failures = perform(&mut store, ["dual"], "elsewhere").unwrap_err();
    assert_eq!(failures.len(), 1);
    assert!(!store.has_group("elsewhere"));
}
