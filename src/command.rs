// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Registration and removal driven by user input.
//!
//! The `add` and `rm` commands take loose input from the command line, i.e.,
//! paths to working copies and target tokens. The methods here turn that
//! input into entity store primitive calls, so the command line only has to
//! collect errors and decide whether to persist.

use crate::{
    mover::{resolve, TargetError, TargetKind},
    remote::{find_remotes, repository_id_from_path, RemoteError},
    store::{Store, StoreError},
};

use std::path::{Path, PathBuf};
use tracing::{info, instrument};

impl Store {
    /// Register working copy and place it into groups.
    ///
    /// The path is canonicalized first. Without an explicit id, the directory
    /// name of the working copy becomes the id. Remotes are read from the
    /// working copy itself. Missing groups go through
    /// [`Store::auto_create_group`].
    ///
    /// Returns id the repository was registered under.
    ///
    /// # Errors
    ///
    /// - Return [`CommandError::Canonicalize`] if path cannot be resolved.
    /// - Return [`CommandError::NoRepositoryId`] if no id is given, and none
    ///   can be derived from path.
    /// - Return [`CommandError::Remote`] if path is not a git working copy.
    /// - Return [`CommandError::Store`] if registration or group creation
    ///   fails.
    #[instrument(skip(self, path), level = "debug")]
    pub fn register(
        &mut self,
        path: impl AsRef<Path>,
        id: Option<&str>,
        groups: &[String],
    ) -> Result<String> {
        let path = path
            .as_ref()
            .canonicalize()
            .map_err(|source| CommandError::Canonicalize {
                source,
                path: path.as_ref().into(),
            })?;
        let id = match id {
            Some(id) => id.to_string(),
            None => repository_id_from_path(&path)
                .ok_or_else(|| CommandError::NoRepositoryId { path: path.clone() })?,
        };
        let remotes = find_remotes(&path)?;

        self.create_repository(&id, path, None, remotes)?;
        for group in groups {
            self.auto_create_group(group, None, false)?;
            self.relate(group, &id);
        }

        Ok(id)
    }

    /// Remove whatever a target token names.
    ///
    /// A group is deleted, a repository is deleted along with its relations,
    /// and a "group/repository" token only breaks that one relation.
    ///
    /// Returns the kind the token resolved to.
    ///
    /// # Errors
    ///
    /// - Return [`CommandError::Target`] if token does not resolve cleanly.
    /// - Return [`CommandError::Unresolved`] if token names nothing known.
    /// - Return [`CommandError::Store`] if a group still has members and
    ///   removal is not forced.
    #[instrument(skip(self), level = "debug")]
    pub fn remove_target(&mut self, token: &str, force: bool) -> Result<TargetKind> {
        let target = resolve(token, self);
        if let Some(error) = target.error {
            return Err(error.into());
        }

        match target.kind {
            TargetKind::Group if force => {
                self.force_delete_group(&target.group_name)?;
            }
            TargetKind::Group => {
                self.delete_group(&target.group_name)?;
            }
            TargetKind::Repository => {
                self.delete_repository(&target.repository_name)?;
            }
            TargetKind::GroupAndRepo => {
                self.unrelate(&target.group_name, &target.repository_name);
            }
            TargetKind::GroupOrRepo | TargetKind::Unknown => {
                return Err(CommandError::Unresolved {
                    token: token.into(),
                });
            }
        }
        info!("removed {token} ({})", target.kind);

        Ok(target.kind)
    }
}

/// Command error types.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Path of working copy cannot be resolved.
    #[error("cannot resolve {:?}", .path.display())]
    Canonicalize {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// No repository id can be derived from path.
    #[error("cannot derive repository id from {:?}", .path.display())]
    NoRepositoryId { path: PathBuf },

    /// Token names neither a group nor a repository.
    #[error("{token}: no such group or repository")]
    Unresolved { token: String },

    /// Token does not resolve cleanly.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// Entity store primitive failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Working copy cannot be inspected.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Friendly result alias :3
pub type Result<T, E = CommandError> = std::result::Result<T, E>;
