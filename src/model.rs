// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Registry data model.
//!
//! The registry tracks three kinds of entities: __repositories__ (checked-out
//! working copies), __groups__ (named buckets), and __relations__ (links that
//! place a repository into a group). Groups may overlap freely, so one
//! repository can belong to many groups at once.
//!
//! All three collections live inside a [`Database`], which is loaded into
//! memory as a whole, mutated through [`Store`](crate::store::Store), and
//! written back as a whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

/// Tracked working copy.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Repository {
    /// Unique key of the repository.
    pub id: String,

    /// Location of the working copy.
    pub path: PathBuf,

    /// Brief description of the repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Remotes configured in the working copy.
    #[serde(default)]
    pub remotes: Vec<Remote>,
}

impl Repository {
    /// Construct new repository entry.
    pub fn new(
        id: impl Into<String>,
        path: impl Into<PathBuf>,
        description: Option<String>,
        remotes: Vec<Remote>,
    ) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            description,
            remotes,
        }
    }

    /// Treat repository location as [`Path`] slice.
    pub fn as_path(&self) -> &Path {
        self.path.as_path()
    }

    /// Find the remote to treat as origin.
    ///
    /// Prefers the remote literally named "origin", and otherwise falls back
    /// to the first remote listed.
    pub fn origin(&self) -> Option<&Remote> {
        self.remotes
            .iter()
            .find(|remote| remote.name == "origin")
            .or_else(|| self.remotes.first())
    }
}

/// Remote of a tracked working copy.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Remote {
    /// Name of remote, e.g., "origin".
    pub name: String,

    /// URL of remote.
    pub url: String,
}

impl Remote {
    /// Construct new remote.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

impl Display for Remote {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}: {}", self.name, self.url)
    }
}

/// Named bucket of repositories.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Group {
    /// Unique key of the group.
    pub name: String,

    /// Brief description of the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Hide member listing when printing the group.
    #[serde(default)]
    pub omit_list: bool,
}

impl Group {
    /// Construct new group entry.
    pub fn new(name: impl Into<String>, description: Option<String>, omit_list: bool) -> Self {
        Self {
            name: name.into(),
            description,
            omit_list,
        }
    }
}

/// Link placing a repository into a group.
///
/// Identity is the pair itself.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Relation {
    /// Key of the linked repository.
    pub repository_id: String,

    /// Key of the linked group.
    pub group_name: String,
}

impl Relation {
    /// Construct new relation.
    pub fn new(group_name: impl Into<String>, repository_id: impl Into<String>) -> Self {
        Self {
            repository_id: repository_id.into(),
            group_name: group_name.into(),
        }
    }

    pub(crate) fn is(&self, group_name: &str, repository_id: &str) -> bool {
        self.group_name == group_name && self.repository_id == repository_id
    }
}

impl Display for Relation {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}/{}", self.group_name, self.repository_id)
    }
}

/// Aggregate of all registry collections.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Database {
    /// Last time the database was modified.
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub repositories: Vec<Repository>,

    #[serde(default)]
    pub groups: Vec<Group>,

    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            timestamp: Utc::now(),
            repositories: Vec::new(),
            groups: Vec::new(),
            relations: Vec::new(),
        }
    }
}
