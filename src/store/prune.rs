// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Garbage collection of stale registry entries.
//!
//! The prune sweep runs in two phases:
//!
//! 1. Remove every repository whose working copy no longer exists on disk.
//!    Removal cascades to its relations.
//! 2. Clear dangling relations, then remove every repository and group that
//!    no longer takes part in any relation.
//!
//! Phase two is computed only after phase one has finished cascading, so a
//! group emptied by phase one gets collected in the same sweep.

use crate::{model::Database, store::Store};

use std::path::Path;
use tracing::{info, instrument};

/// Existence check for working copy paths.
pub trait PathCheck {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Check paths against the real file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystem;

impl PathCheck for FileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Entities that take part in zero relations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneTargets {
    /// Ids of orphaned repositories.
    pub repositories: Vec<String>,

    /// Names of orphaned groups.
    pub groups: Vec<String>,
}

impl PruneTargets {
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty() && self.groups.is_empty()
    }
}

/// Everything removed by a prune sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneReport {
    /// Ids of repositories whose working copy was missing.
    pub missing: Vec<String>,

    /// Number of dangling relations cleared.
    pub dangling_relations: usize,

    /// Orphans removed after missing repositories were gone.
    pub orphans: PruneTargets,
}

impl Store {
    /// Identify repositories and groups that take part in zero relations.
    ///
    /// Pure query, nothing gets removed.
    pub fn prune_targets(&self) -> PruneTargets {
        let relations = self.relations();
        let repositories = self
            .repositories()
            .iter()
            .filter(|repo| !relations.iter().any(|rel| rel.repository_id == repo.id))
            .map(|repo| repo.id.clone())
            .collect();
        let groups = self
            .groups()
            .iter()
            .filter(|group| !relations.iter().any(|rel| rel.group_name == group.name))
            .map(|group| group.name.clone())
            .collect();

        PruneTargets {
            repositories,
            groups,
        }
    }

    /// List ids of repositories whose working copy does not exist.
    pub fn missing_repositories(&self, check: &impl PathCheck) -> Vec<String> {
        self.repositories()
            .iter()
            .filter(|repo| !check.exists(repo.as_path()))
            .map(|repo| repo.id.clone())
            .collect()
    }

    /// Perform prune sweep.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError`](crate::store::StoreError) if a removal fails.
    #[instrument(skip(self, check), level = "debug")]
    pub fn prune(&mut self, check: &impl PathCheck) -> super::Result<PruneReport> {
        let missing = self.missing_repositories(check);
        for id in &missing {
            info!("working copy of {id:?} is gone");
            self.delete_repository(id)?;
        }

        let dangling_relations = self.clear_dangling_relations();

        let orphans = self.prune_targets();
        for id in &orphans.repositories {
            self.delete_repository(id)?;
        }
        for name in &orphans.groups {
            self.delete_group(name)?;
        }

        Ok(PruneReport {
            missing,
            dangling_relations,
            orphans,
        })
    }

    fn clear_dangling_relations(&mut self) -> usize {
        let Database {
            repositories,
            groups,
            relations,
            ..
        } = &mut self.database;

        let before = relations.len();
        relations.retain(|rel| {
            groups.iter().any(|group| group.name == rel.group_name)
                && repositories.iter().any(|repo| repo.id == rel.repository_id)
        });

        let cleared = before - relations.len();
        if cleared > 0 {
            info!("cleared {cleared} dangling relation(s)");
            self.dirty = true;
        }

        cleared
    }
}
