// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Move planning.
//!
//! Decide which single move operation a set of resolved sources and one
//! resolved destination describe. Planning only looks at target kinds, never
//! at the store, and never mutates anything.

use crate::mover::target::{Target, TargetKind};

use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::debug;

/// Move operation chosen for a set of sources and a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionKind {
    /// Re-link every member of one group into another group.
    GroupToGroup,

    /// Re-link every member of several groups into one group.
    GroupsToGroup,

    /// Link one or more repositories into a group.
    RepositoriesToGroup,

    /// Move one repository from one group into another.
    RepositoryToRepository,

    /// Combination that cannot be moved.
    Invalid,
}

impl Display for ExecutionKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::GroupToGroup => "group to group",
            Self::GroupsToGroup => "groups to group",
            Self::RepositoriesToGroup => "repositories to group",
            Self::RepositoryToRepository => "repository to repository",
            Self::Invalid => "invalid",
        };
        fmt.write_str(name)
    }
}

/// Decide move operation for sources and destination.
///
/// # Errors
///
/// - Return [`PlanError`] if the combination has no valid move operation.
pub fn plan(froms: &[Target], to: &Target) -> Result<ExecutionKind> {
    let kind = match froms {
        [] => return Err(PlanError::NoSources),
        [from] => plan_single(from, to)?,
        _ => plan_multiple(froms, to)?,
    };
    debug!("plan move of {} source(s) to {to}: {kind}", froms.len());

    Ok(kind)
}

fn plan_single(from: &Target, to: &Target) -> Result<ExecutionKind> {
    use TargetKind::*;

    if from.kind == Unknown {
        return Err(PlanError::UnknownSource {
            source_token: from.original.clone(),
        });
    }

    if from.kind == Group && to.kind.is_group_like() {
        return Ok(ExecutionKind::GroupToGroup);
    }

    if matches!(from.kind, GroupAndRepo | Repository) && to.kind.is_group_like() {
        return Ok(ExecutionKind::RepositoriesToGroup);
    }

    // NOTE: A bare repository source matches here whatever the destination.
    if from.kind == Repository || (from.kind == GroupAndRepo && to.kind == GroupAndRepo) {
        return Ok(ExecutionKind::RepositoryToRepository);
    }

    Err(PlanError::Unsupported {
        from: from.kind,
        to: to.kind,
    })
}

fn plan_multiple(froms: &[Target], to: &Target) -> Result<ExecutionKind> {
    if !to.kind.is_group_like() {
        return Err(PlanError::TypeMismatch { to: to.kind });
    }

    let merged = merge_kinds(froms)?;
    match merged {
        TargetKind::GroupAndRepo | TargetKind::Repository => Ok(ExecutionKind::RepositoriesToGroup),
        TargetKind::Group => Ok(ExecutionKind::GroupsToGroup),
        TargetKind::GroupOrRepo | TargetKind::Unknown => Err(PlanError::UnknownSource {
            source_token: froms
                .iter()
                .map(|from| from.original.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }),
    }
}

fn merge_kinds(froms: &[Target]) -> Result<TargetKind> {
    let mut kinds = froms.iter().map(|from| from.kind);
    let first = kinds.next().ok_or(PlanError::NoSources)?;
    if let Some(other) = kinds.find(|kind| *kind != first) {
        return Err(PlanError::MixedSources { first, other });
    }

    Ok(first)
}

/// Move planning error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// No source was given.
    #[error("no move source given")]
    NoSources,

    /// Source could not be classified.
    #[error("{source_token}: unknown type not acceptable")]
    UnknownSource { source_token: String },

    /// Destination cannot receive several sources.
    #[error("froms and to did not match: cannot move several sources into a {to}")]
    TypeMismatch { to: TargetKind },

    /// Sources do not share one kind.
    #[error("types of froms contain different types: {first} and {other}")]
    MixedSources { first: TargetKind, other: TargetKind },

    /// Single source and destination have no move operation.
    #[error("cannot move {from} to {to}")]
    Unsupported { from: TargetKind, to: TargetKind },
}

/// Friendly result alias :3
pub type Result<T, E = PlanError> = std::result::Result<T, E>;
