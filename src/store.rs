// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Entity store management and manipulation.
//!
//! The __entity store__ owns the in-memory copy of the registry database, and
//! exposes the only primitives allowed to mutate it. Every primitive either
//! succeeds completely, or fails with a [`StoreError`] while leaving the
//! database untouched for that call.
//!
//! # Deferred Commit
//!
//! The store never writes anything to disk by itself. Callers load a
//! [`Database`] through a [`Persistence`] collaborator, wrap it in a [`Store`],
//! perform a sequence of mutations, and only hand the database back to the
//! persistence collaborator if the whole sequence succeeded. There is no
//! rollback across calls. Failed sequences are simply never persisted.
//!
//! # Dangling Relations
//!
//! A relation may name a group or repository that no longer exists. The
//! store tolerates that state, e.g., [`Store::relate`] does not validate its
//! arguments. Only the [prune sweep](Store::prune) clears dangling relations.

pub mod persist;
pub mod prune;

pub use persist::{JsonFile, Persistence, PersistError};
pub use prune::{FileSystem, PathCheck, PruneReport, PruneTargets};

use crate::model::{Database, Group, Relation, Remote, Repository};

use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Behavior switches of the entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Allow [`Store::auto_create_group`] to create missing groups.
    pub auto_create_group: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            auto_create_group: true,
        }
    }
}

/// In-memory registry of repositories, groups, and relations.
#[derive(Debug, Clone, Default)]
pub struct Store {
    database: Database,
    options: StoreOptions,
    dirty: bool,
}

impl Store {
    /// Construct new store around a loaded database.
    pub fn new(database: Database, options: StoreOptions) -> Self {
        Self {
            database,
            options,
            dirty: false,
        }
    }

    /// Load database through persistence collaborator.
    ///
    /// # Errors
    ///
    /// - Return [`PersistError`] if the database cannot be loaded.
    pub fn load(
        persistence: &impl Persistence,
        options: StoreOptions,
    ) -> Result<Self, PersistError> {
        Ok(Self::new(persistence.load()?, options))
    }

    /// Check if any mutation occurred since construction.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read-only view of the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Give back database, refreshing its timestamp if it was mutated.
    pub fn into_database(mut self) -> Database {
        if self.dirty {
            self.database.timestamp = Utc::now();
        }

        self.database
    }

    /// All repositories in registration order.
    pub fn repositories(&self) -> &[Repository] {
        &self.database.repositories
    }

    /// All groups in creation order.
    pub fn groups(&self) -> &[Group] {
        &self.database.groups
    }

    /// All relations in creation order.
    pub fn relations(&self) -> &[Relation] {
        &self.database.relations
    }

    pub fn find_group(&self, name: &str) -> Option<&Group> {
        self.database.groups.iter().find(|group| group.name == name)
    }

    pub fn find_repository(&self, id: &str) -> Option<&Repository> {
        self.database.repositories.iter().find(|repo| repo.id == id)
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.group_index(name).is_some()
    }

    pub fn has_repository(&self, id: &str) -> bool {
        self.repository_index(id).is_some()
    }

    pub fn has_relation(&self, group_name: &str, repository_id: &str) -> bool {
        self.database
            .relations
            .iter()
            .any(|relation| relation.is(group_name, repository_id))
    }

    /// List ids of repositories related to target group.
    pub fn relations_of_group(&self, name: &str) -> Vec<String> {
        self.database
            .relations
            .iter()
            .filter(|relation| relation.group_name == name)
            .map(|relation| relation.repository_id.clone())
            .collect()
    }

    /// List names of groups related to target repository.
    pub fn relations_of_repository(&self, id: &str) -> Vec<String> {
        self.database
            .relations
            .iter()
            .filter(|relation| relation.repository_id == id)
            .map(|relation| relation.group_name.clone())
            .collect()
    }

    /// Create new group.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::InvalidName`] if name is empty.
    /// - Return [`StoreError::DuplicateName`] if group already exists.
    #[instrument(skip(self), level = "debug")]
    pub fn create_group(
        &mut self,
        name: &str,
        description: Option<String>,
        omit_list: bool,
    ) -> Result<&Group> {
        if name.is_empty() {
            return Err(StoreError::InvalidName { kind: "group" });
        }

        if self.has_group(name) {
            return Err(StoreError::DuplicateName { name: name.into() });
        }

        info!("create group {name:?}");
        let index = self.database.groups.len();
        self.database
            .groups
            .push(Group::new(name, description, omit_list));
        self.dirty = true;

        Ok(&self.database.groups[index])
    }

    /// Find group, or create it if auto creation is allowed.
    ///
    /// Existing groups are returned unchanged.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::GroupNotFound`] if group is missing and auto
    ///   creation is disabled.
    /// - Return [`StoreError::InvalidName`] if name is empty.
    pub fn auto_create_group(
        &mut self,
        name: &str,
        description: Option<String>,
        omit_list: bool,
    ) -> Result<&Group> {
        if let Some(index) = self.group_index(name) {
            return Ok(&self.database.groups[index]);
        }

        if !self.options.auto_create_group {
            return Err(StoreError::GroupNotFound { name: name.into() });
        }

        self.create_group(name, description, omit_list)
    }

    /// Register new repository.
    ///
    /// Registering the same id with the same path again is a success that
    /// leaves the existing entry untouched.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::InvalidName`] if id is empty.
    /// - Return [`StoreError::DuplicateId`] if id is already registered with
    ///   a different path.
    #[instrument(skip(self, path, remotes), level = "debug")]
    pub fn create_repository(
        &mut self,
        id: &str,
        path: impl Into<PathBuf>,
        description: Option<String>,
        remotes: Vec<Remote>,
    ) -> Result<&Repository> {
        if id.is_empty() {
            return Err(StoreError::InvalidName { kind: "repository" });
        }

        let path = path.into();
        if let Some(index) = self.repository_index(id) {
            let existing = &self.database.repositories[index];
            if existing.path != path {
                return Err(StoreError::DuplicateId {
                    id: id.into(),
                    path: existing.path.clone(),
                });
            }

            debug!("repository {id:?} already registered at {:?}", path.display());
            return Ok(existing);
        }

        info!("register repository {id:?} at {:?}", path.display());
        let index = self.database.repositories.len();
        self.database
            .repositories
            .push(Repository::new(id, path, description, remotes));
        self.dirty = true;

        Ok(&self.database.repositories[index])
    }

    /// Remove repository along with every relation naming it.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::RepositoryNotFound`] if repository is missing.
    #[instrument(skip(self), level = "debug")]
    pub fn delete_repository(&mut self, id: &str) -> Result<Repository> {
        let index = self
            .repository_index(id)
            .ok_or_else(|| StoreError::RepositoryNotFound { id: id.into() })?;

        info!("remove repository {id:?}");
        let removed = self.database.repositories.remove(index);
        self.database
            .relations
            .retain(|relation| relation.repository_id != id);
        self.dirty = true;

        Ok(removed)
    }

    /// Remove empty group.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::GroupNotFound`] if group is missing.
    /// - Return [`StoreError::NotEmpty`] if group still has members.
    pub fn delete_group(&mut self, name: &str) -> Result<Group> {
        let members = self.relations_of_group(name).len();
        if self.has_group(name) && members > 0 {
            return Err(StoreError::NotEmpty {
                name: name.into(),
                members,
            });
        }

        self.force_delete_group(name)
    }

    /// Remove group along with every relation naming it.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::GroupNotFound`] if group is missing.
    #[instrument(skip(self), level = "debug")]
    pub fn force_delete_group(&mut self, name: &str) -> Result<Group> {
        let index = self
            .group_index(name)
            .ok_or_else(|| StoreError::GroupNotFound { name: name.into() })?;

        info!("remove group {name:?}");
        let removed = self.database.groups.remove(index);
        self.database
            .relations
            .retain(|relation| relation.group_name != name);
        self.dirty = true;

        Ok(removed)
    }

    /// Link repository into group.
    ///
    /// Returns `false` if the relation already existed.
    #[instrument(skip(self), level = "debug")]
    pub fn relate(&mut self, group_name: &str, repository_id: &str) -> bool {
        if self.has_relation(group_name, repository_id) {
            return false;
        }

        debug!("relate {repository_id:?} to {group_name:?}");
        self.database
            .relations
            .push(Relation::new(group_name, repository_id));
        self.dirty = true;

        true
    }

    /// Unlink repository from group.
    ///
    /// Returns `false` if there was no such relation.
    #[instrument(skip(self), level = "debug")]
    pub fn unrelate(&mut self, group_name: &str, repository_id: &str) -> bool {
        let before = self.database.relations.len();
        self.database
            .relations
            .retain(|relation| !relation.is(group_name, repository_id));

        let removed = self.database.relations.len() != before;
        if removed {
            debug!("unrelate {repository_id:?} from {group_name:?}");
            self.dirty = true;
        }

        removed
    }

    /// Replace all attributes of a group.
    ///
    /// Renaming a group rewrites every relation that names it.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::GroupNotFound`] if group is missing.
    /// - Return [`StoreError::InvalidName`] if new name is empty.
    /// - Return [`StoreError::DuplicateName`] if new name belongs to another
    ///   group.
    #[instrument(skip(self), level = "debug")]
    pub fn update_group(&mut self, name: &str, group: Group) -> Result<&Group> {
        let index = self
            .group_index(name)
            .ok_or_else(|| StoreError::GroupNotFound { name: name.into() })?;

        if group.name.is_empty() {
            return Err(StoreError::InvalidName { kind: "group" });
        }

        if group.name != name {
            if self.has_group(&group.name) {
                return Err(StoreError::DuplicateName { name: group.name });
            }

            info!("rename group {name:?} to {:?}", group.name);
            for relation in &mut self.database.relations {
                if relation.group_name == name {
                    relation.group_name.clone_from(&group.name);
                }
            }
        }

        self.database.groups[index] = group;
        self.dirty = true;

        Ok(&self.database.groups[index])
    }

    /// Replace all attributes of a repository.
    ///
    /// Changing the id of a repository rewrites every relation that names it.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::RepositoryNotFound`] if repository is missing.
    /// - Return [`StoreError::InvalidName`] if new id is empty.
    /// - Return [`StoreError::DuplicateId`] if new id belongs to another
    ///   repository.
    #[instrument(skip(self), level = "debug")]
    pub fn update_repository(&mut self, id: &str, repository: Repository) -> Result<&Repository> {
        let index = self
            .repository_index(id)
            .ok_or_else(|| StoreError::RepositoryNotFound { id: id.into() })?;

        if repository.id.is_empty() {
            return Err(StoreError::InvalidName { kind: "repository" });
        }

        if repository.id != id {
            if let Some(other) = self.find_repository(&repository.id) {
                return Err(StoreError::DuplicateId {
                    id: repository.id.clone(),
                    path: other.path.clone(),
                });
            }

            info!("rename repository {id:?} to {:?}", repository.id);
            for relation in &mut self.database.relations {
                if relation.repository_id == id {
                    relation.repository_id.clone_from(&repository.id);
                }
            }
        }

        self.database.repositories[index] = repository;
        self.dirty = true;

        Ok(&self.database.repositories[index])
    }

    fn group_index(&self, name: &str) -> Option<usize> {
        self.database
            .groups
            .iter()
            .position(|group| group.name == name)
    }

    fn repository_index(&self, id: &str) -> Option<usize> {
        self.database
            .repositories
            .iter()
            .position(|repo| repo.id == id)
    }
}

/// All possible error types for entity store interaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Target group does not exist.
    #[error("group {name:?} not found")]
    GroupNotFound { name: String },

    /// Target repository does not exist.
    #[error("repository {id:?} not found")]
    RepositoryNotFound { id: String },

    /// Group name is already taken.
    #[error("group {name:?} already exists")]
    DuplicateName { name: String },

    /// Repository id is already registered with another path.
    #[error("repository {id:?} already registered at {:?}", .path.display())]
    DuplicateId { id: String, path: PathBuf },

    /// Group cannot be deleted while it still has members.
    #[error("group {name:?} is not empty ({members} member(s))")]
    NotEmpty { name: String, members: usize },

    /// Entity key is empty.
    #[error("{kind} name must not be empty")]
    InvalidName { kind: &'static str },
}

/// Friendly result alias :3
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
