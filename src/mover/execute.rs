// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Move execution.
//!
//! Carry out a planned move through entity store primitives. Two strategies
//! exist, chosen by [`ExecutionKind`]:
//!
//! - __fail fast__: single-source moves stop at the first error.
//! - __accumulate__: multi-source moves keep going past a failed source, and
//!   report every error at the end.
//!
//! Mutations already applied are never rolled back. Callers must only persist
//! the store when execution reports no error at all.

use crate::{
    mover::{
        plan::{ExecutionKind, PlanError},
        target::{Target, TargetError, TargetKind},
    },
    store::{Store, StoreError},
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    slice::Iter,
    vec::IntoIter,
};
use tracing::{debug, info, instrument};

/// Perform move operation on store.
///
/// # Errors
///
/// - Return [`MoveFailures`] holding every error met along the way.
pub fn execute(
    store: &mut Store,
    froms: &[Target],
    to: &Target,
    kind: ExecutionKind,
) -> Result<(), MoveFailures> {
    info!("move {} source(s) to {to} as {kind}", froms.len());
    let errors = match kind {
        ExecutionKind::GroupToGroup => {
            fail_fast(|| group_to_group(store, first_source(froms)?, to))
        }
        ExecutionKind::GroupsToGroup => {
            accumulate(froms, |from| group_to_group(store, from, to))
        }
        ExecutionKind::RepositoriesToGroup => {
            accumulate(froms, |from| repository_to_group(store, from, to))
        }
        ExecutionKind::RepositoryToRepository => {
            fail_fast(|| repository_to_repository(store, first_source(froms)?, to))
        }
        ExecutionKind::Invalid => vec![MoveError::UnexpectedKind(kind)],
    };

    MoveFailures::check(errors)
}

fn fail_fast(step: impl FnOnce() -> Result<()>) -> Vec<MoveError> {
    step().err().into_iter().collect()
}

fn accumulate(froms: &[Target], mut step: impl FnMut(&Target) -> Result<()>) -> Vec<MoveError> {
    froms.iter().filter_map(|from| step(from).err()).collect()
}

fn first_source(froms: &[Target]) -> Result<&Target> {
    froms.first().ok_or(MoveError::Plan(PlanError::NoSources))
}

#[instrument(skip_all, fields(from = %from, to = %to), level = "debug")]
fn group_to_group(store: &mut Store, from: &Target, to: &Target) -> Result<()> {
    store.auto_create_group(&to.group_name, None, false)?;
    for repo in store.relations_of_group(&from.group_name) {
        store.unrelate(&from.group_name, &repo);
        store.relate(&to.group_name, &repo);
    }

    Ok(())
}

#[instrument(skip_all, fields(from = %from, to = %to), level = "debug")]
fn repository_to_group(store: &mut Store, from: &Target, to: &Target) -> Result<()> {
    if to.kind.is_group_like() {
        store.auto_create_group(&to.group_name, None, false)?;
    }

    if from.kind == TargetKind::GroupAndRepo {
        store.unrelate(&from.group_name, &from.repository_name);
    }
    store.relate(&to.group_name, &from.repository_name);

    Ok(())
}

#[instrument(skip_all, fields(from = %from, to = %to), level = "debug")]
fn repository_to_repository(store: &mut Store, from: &Target, to: &Target) -> Result<()> {
    if from.repository_name != to.repository_name {
        return Err(MoveError::NameMismatch {
            from: from.repository_name.clone(),
            to: to.repository_name.clone(),
        });
    }

    store.auto_create_group(&to.group_name, None, false)?;
    if from.kind == TargetKind::GroupAndRepo {
        store.unrelate(&from.group_name, &from.repository_name);
    }
    store.relate(&to.group_name, &to.repository_name);
    debug!("moved {} into {}", to.repository_name, to.group_name);

    Ok(())
}

/// Move error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// Source token did not resolve cleanly.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// Sources and destination have no move operation.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Entity store primitive failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Repository part of source and destination differ.
    #[error("repository name did not match: {from}, {to}")]
    NameMismatch { from: String, to: String },

    /// Execution was asked for a kind it cannot perform.
    #[error("unexpected execution kind: {0}")]
    UnexpectedKind(ExecutionKind),
}

/// Non-empty collection of move errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveFailures {
    errors: Vec<MoveError>,
}

impl MoveFailures {
    /// Wrap errors, or succeed if there are none.
    pub fn check(errors: Vec<MoveError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self { errors })
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, MoveError> {
        self.errors.iter()
    }
}

impl From<MoveError> for MoveFailures {
    fn from(error: MoveError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for MoveFailures {
    type Item = MoveError;
    type IntoIter = IntoIter<MoveError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a MoveFailures {
    type Item = &'a MoveError;
    type IntoIter = Iter<'a, MoveError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl Display for MoveFailures {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let lines = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        fmt.write_str(&lines.join("\n"))
    }
}

impl std::error::Error for MoveFailures {}

/// Friendly result alias :3
pub type Result<T, E = MoveError> = std::result::Result<T, E>;
