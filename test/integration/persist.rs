// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use anyhow::Result;
use pretty_assertions::assert_eq;
use repolink::{
    mover::perform,
    store::{JsonFile, Persistence},
    Remote, Store, StoreOptions,
};

#[test]
fn store_survives_round_trip_through_json_file() -> Result<()> {
    let root = tempfile::tempdir()?;
    let file = JsonFile::new(root.path().join("nested").join("database.json"));

    let mut store = Store::load(&file, StoreOptions::default())?;
    assert!(store.repositories().is_empty());

    store.create_group("work", Some("day job".into()), false)?;
    store.create_repository(
        "repolink",
        "/src/repolink",
        None,
        vec![Remote::new("origin", "https://blah.org/repolink.git")],
    )?;
    store.relate("work", "repolink");
    assert!(store.is_dirty());
    file.store(&store.into_database())?;

    let store = Store::load(&file, StoreOptions::default())?;
    assert!(!store.is_dirty());
    assert!(store.has_relation("work", "repolink"));
    assert_eq!(
        store.find_group("work").and_then(|group| group.description.as_deref()),
        Some("day job")
    );
    assert_eq!(
        store
            .find_repository("repolink")
            .and_then(|repo| repo.origin())
            .map(|remote| remote.url.as_str()),
        Some("https://blah.org/repolink.git")
    );

    Ok(())
}

#[test]
fn failed_move_leaves_persisted_database_untouched() -> Result<()> {
    let root = tempfile::tempdir()?;
    let file = JsonFile::new(root.path().join("database.json"));

    let mut store = Store::load(&file, StoreOptions::default())?;
    store.create_group("group1", None, false)?;
    store.create_repository("repo1", "/src/repo1", None, Vec::new())?;
    store.relate("group1", "repo1");
    file.store(&store.into_database())?;
    let before = std::fs::read_to_string(file.as_path())?;

    let options = StoreOptions {
        auto_create_group: false,
    };
    let mut store = Store::load(&file, options)?;
    match perform(&mut store, ["group1/repo1", "group1/nope"], "group2") {
        Ok(_) => file.store(&store.into_database())?,
        Err(failures) => assert_eq!(failures.len(), 1),
    }

    assert_eq!(std::fs::read_to_string(file.as_path())?, before);

    Ok(())
}
