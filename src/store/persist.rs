// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Database persistence.
//!
//! The registry database is read into memory once per command, and written
//! back once at the end, as a whole. Only the logical layout of [`Database`]
//! matters. [`JsonFile`] encodes it as pretty printed JSON.

use crate::model::Database;

use std::{
    fs::{read_to_string, rename, write},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Load and store the registry database.
pub trait Persistence {
    /// Load full database.
    fn load(&self) -> Result<Database>;

    /// Replace stored database with given one.
    fn store(&self, database: &Database) -> Result<()>;
}

/// Database kept in a JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Construct new JSON file persistence at target path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Treat database file location as [`Path`] slice.
    pub fn as_path(&self) -> &Path {
        self.path.as_path()
    }
}

impl Persistence for JsonFile {
    /// Load database from JSON file.
    ///
    /// A missing file is treated as an empty database.
    ///
    /// # Errors
    ///
    /// - Return [`PersistError::Read`] if file cannot be read.
    /// - Return [`PersistError::Deserialize`] if file content is malformed.
    #[instrument(skip(self), level = "debug")]
    fn load(&self) -> Result<Database> {
        let content = match read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no database at {:?}, start empty", self.path.display());
                return Ok(Database::default());
            }
            Err(err) => {
                return Err(PersistError::Read {
                    source: err,
                    path: self.path.clone(),
                })
            }
        };

        serde_json::from_str(&content).map_err(|err| PersistError::Deserialize {
            source: err,
            path: self.path.clone(),
        })
    }

    /// Write database to JSON file.
    ///
    /// Creates parent directories as needed. Content is written to a sibling
    /// temporary file first, which then replaces the target.
    ///
    /// # Errors
    ///
    /// - Return [`PersistError::Serialize`] if database cannot be encoded.
    /// - Return [`PersistError::Write`] if file cannot be written.
    #[instrument(skip(self, database), level = "debug")]
    fn store(&self, database: &Database) -> Result<()> {
        let content = serde_json::to_string_pretty(database).map_err(PersistError::Serialize)?;
        let write_err = |err: std::io::Error| PersistError::Write {
            source: err,
            path: self.path.clone(),
        };

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            mkdirp::mkdirp(parent).map_err(write_err)?;
        }

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        write(&staging, content.as_bytes()).map_err(write_err)?;
        rename(&staging, &self.path).map_err(write_err)?;
        debug!("stored database at {:?}", self.path.display());

        Ok(())
    }
}

/// Persistence error types.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Database file cannot be read.
    #[error("failed to read database at {:?}", .path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Database file cannot be written.
    #[error("failed to write database at {:?}", .path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Database file content is malformed.
    #[error("failed to parse database at {:?}", .path.display())]
    Deserialize {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },

    /// Database cannot be encoded.
    #[error(transparent)]
    Serialize(serde_json::Error),
}

/// Friendly result alias :3
pub type Result<T, E = PersistError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, Relation, Remote, Repository};
    use pretty_assertions::assert_eq;

    #[test]
    fn load_missing_file_yields_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("nope.json"));
        let database = file.load().unwrap();
        assert!(database.repositories.is_empty());
        assert!(database.groups.is_empty());
        assert!(database.relations.is_empty());
    }

    #[test]
    fn store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("deep").join("er").join("database.json"));

        let mut database = Database::default();
        database.repositories.push(Repository::new(
            "foo",
            "/src/foo",
            Some("blah".into()),
            vec![Remote::new("origin", "https://blah.org/foo.git")],
        ));
        database.groups.push(Group::new("work", None, true));
        database.relations.push(Relation::new("work", "foo"));
        file.store(&database).unwrap();

        assert!(file.as_path().exists());
        assert_eq!(file.load().unwrap(), database);
    }

    #[test]
    fn load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        write(&path, "{ not json").unwrap();

        let result = JsonFile::new(&path).load();
        assert!(matches!(result, Err(PersistError::Deserialize { .. })));
    }
}
