// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::RepoFixture;

use anyhow::Result;
use indicatif::ProgressBar;
use pretty_assertions::assert_eq;
use repolink::{
    remote::{clone_remote, find_remotes, repository_id_from_path},
    Remote,
};

#[test]
fn find_remotes_lists_configured_remotes() -> Result<()> {
    let root = tempfile::tempdir()?;
    let fixture = RepoFixture::new(root.path().join("dotfiles"))?
        .with_remote("origin", "https://blah.org/dotfiles.git")?
        .with_remote("mirror", "git@blah.org:me/dotfiles.git")?;

    let mut remotes = find_remotes(fixture.workdir())?;
    remotes.sort_by(|lhs, rhs| lhs.name.cmp(&rhs.name));
    assert_eq!(
        remotes,
        vec![
            Remote::new("mirror", "git@blah.org:me/dotfiles.git"),
            Remote::new("origin", "https://blah.org/dotfiles.git"),
        ]
    );

    Ok(())
}

#[test]
fn find_remotes_rejects_plain_directory() -> Result<()> {
    let root = tempfile::tempdir()?;
    assert!(find_remotes(root.path()).is_err());

    Ok(())
}

#[test]
fn clone_remote_checks_out_local_repository() -> Result<()> {
    let root = tempfile::tempdir()?;
    let upstream = RepoFixture::new(root.path().join("upstream").join("notes"))?;
    upstream.stage_and_commit("todo.md", "- write tests")?;

    let destination = root.path().join("checkouts");
    let url = upstream.workdir().display().to_string();
    let path = clone_remote(&url, &destination, ProgressBar::hidden())?;

    assert_eq!(path, destination.join("notes"));
    assert_eq!(repository_id_from_path(&path).as_deref(), Some("notes"));
    assert!(path.join(".git").exists());

    let remotes = find_remotes(&path)?;
    assert_eq!(remotes.len(), 1);
    assert_eq!(remotes[0].name, "origin");

    Ok(())
}
