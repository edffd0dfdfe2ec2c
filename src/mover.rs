// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Move repositories between groups.
//!
//! A move takes one or more source tokens and one destination token, and
//! goes through three stages:
//!
//! 1. [`resolve`] classifies each token against the store.
//! 2. [`plan`] merges the classifications into one [`ExecutionKind`].
//! 3. [`execute`] performs the chosen operation through store primitives.
//!
//! [`perform`] chains all three the way the command line uses them.

pub mod execute;
pub mod plan;
pub mod target;

pub use execute::{execute, MoveError, MoveFailures};
pub use plan::{plan, ExecutionKind, PlanError};
pub use target::{resolve, Target, TargetError, TargetKind};

use crate::store::Store;

use tracing::debug;

/// Resolve, plan, and execute a move.
///
/// Sources must resolve without any error. The destination only needs a
/// known shape: a "group/repository" destination may name a pairing that
/// does not exist yet.
///
/// # Errors
///
/// - Return [`MoveFailures`] with every source resolution error, the
///   planning error, or every execution error.
pub fn perform(
    store: &mut Store,
    froms: impl IntoIterator<Item = impl AsRef<str>>,
    to: impl AsRef<str>,
) -> Result<ExecutionKind, MoveFailures> {
    let froms = froms
        .into_iter()
        .map(|token| resolve(token.as_ref(), &*store))
        .collect::<Vec<_>>();
    let to = resolve(to.as_ref(), &*store);

    let mut errors = froms
        .iter()
        .filter_map(|from| from.error().cloned().map(MoveError::from))
        .collect::<Vec<_>>();
    if to.kind == TargetKind::Unknown {
        if let Some(error) = to.error() {
            errors.push(error.clone().into());
        }
    }
    MoveFailures::check(errors)?;

    let kind = plan(&froms, &to).map_err(MoveError::from)?;
    debug!("perform {kind} move");
    execute(store, &froms, &to, kind)?;

    Ok(kind)
}
