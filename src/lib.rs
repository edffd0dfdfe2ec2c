// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Local registry of git working copies.
//!
//! Repolink keeps track of checked-out __repositories__, sorts them into
//! named, overlapping __groups__, and records which repository belongs to
//! which group through many-to-many __relations__.
//!
//! # Layout
//!
//! - [`store`]: the entity store and its mutation primitives, along with
//!   persistence and the prune sweep.
//! - [`mover`]: classify user tokens, plan a move, and execute it against the
//!   store.
//! - [`command`]: register working copies and remove targets by name.
//! - [`remote`]: git glue for reading remotes and cloning.
//! - [`config`] and [`path`]: settings and default file locations.

pub mod command;
pub mod config;
pub mod model;
pub mod mover;
pub mod path;
pub mod remote;
pub mod store;

pub use model::{Database, Group, Relation, Remote, Repository};
pub use store::{Store, StoreError, StoreOptions};
