// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the settings file that repolink reads at startup,
//! along with the environment variables that override it.
//!
//! # General Layout
//!
//! The settings file is a flat TOML table. Every key is optional:
//!
//! ```toml
//! auto_create_group = true
//! default_group_name = "no-group"
//! database_path = "$XDG_DATA_HOME/repolink/database.json"
//! clone_destination = "~/src"
//! ```
//!
//! Path values go through shell expansion, so environment variables and a
//! leading tilde can be used freely.
//!
//! # Environment Overrides
//!
//! Each key can be overridden through an environment variable of the same
//! name in upper case, prefixed by `REPOLINK_`, e.g.,
//! `REPOLINK_AUTO_CREATE_GROUP=false`.

use crate::{
    path::{default_config_path, default_database_path, NoWayHome},
    store::StoreOptions,
};

use serde::{Deserialize, Serialize};
use std::{
    env::{self, VarError},
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

pub const AUTO_CREATE_GROUP_VAR: &str = "REPOLINK_AUTO_CREATE_GROUP";
pub const DEFAULT_GROUP_NAME_VAR: &str = "REPOLINK_DEFAULT_GROUP_NAME";
pub const DATABASE_PATH_VAR: &str = "REPOLINK_DATABASE_PATH";
pub const CLONE_DESTINATION_VAR: &str = "REPOLINK_CLONE_DESTINATION";
pub const CONFIG_PATH_VAR: &str = "REPOLINK_CONFIG_PATH";

/// Settings file layout.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Create missing groups on demand instead of failing.
    pub auto_create_group: bool,

    /// Group new repositories land in when no group is given.
    pub default_group_name: String,

    /// Location of database file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Directory to clone new repositories into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_destination: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_create_group: true,
            default_group_name: "no-group".into(),
            database_path: None,
            clone_destination: None,
        }
    }
}

impl Settings {
    /// Load settings file, then apply environment overrides.
    ///
    /// A missing settings file means default settings.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if settings file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if settings file is malformed.
    /// - Return [`ConfigError::InvalidBool`] if a boolean override is bogus.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = match read_to_string(path) {
            Ok(content) => content.parse()?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no settings at {:?}, use defaults", path.display());
                Self::default()
            }
            Err(err) => {
                return Err(ConfigError::Read {
                    source: err,
                    path: path.into(),
                })
            }
        };

        settings.with_env_overrides()
    }

    /// Apply environment variable overrides.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::InvalidBool`] if a boolean override is bogus.
    /// - Return [`ConfigError::ShellExpansion`] if a path override cannot be
    ///   expanded.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(value) = env_var(AUTO_CREATE_GROUP_VAR) {
            self.auto_create_group = parse_bool(AUTO_CREATE_GROUP_VAR, &value)?;
        }

        if let Some(value) = env_var(DEFAULT_GROUP_NAME_VAR) {
            self.default_group_name = value;
        }

        if let Some(value) = env_var(DATABASE_PATH_VAR) {
            self.database_path = Some(expand_path(&value)?);
        }

        if let Some(value) = env_var(CLONE_DESTINATION_VAR) {
            self.clone_destination = Some(expand_path(&value)?);
        }

        Ok(self)
    }

    /// Locate settings file.
    ///
    /// An explicit path wins over [`CONFIG_PATH_VAR`], which wins over the
    /// default location.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ShellExpansion`] if the environment path cannot
    ///   be expanded.
    /// - Return [`ConfigError::NoWayHome`] if default location cannot be
    ///   determined.
    pub fn locate(explicit: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path);
        }

        match env_var(CONFIG_PATH_VAR) {
            Some(value) => expand_path(&value),
            None => Ok(default_config_path()?),
        }
    }

    /// Groups to place new repositories in, given the groups a user named.
    pub fn groups_or_default(&self, groups: Vec<String>) -> Vec<String> {
        if groups.is_empty() {
            vec![self.default_group_name.clone()]
        } else {
            groups
        }
    }

    /// Location of database file, falling back to the default location.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::NoWayHome`] if default location cannot be
    ///   determined.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(default_database_path()?),
        }
    }

    /// Directory to clone into, falling back to the current directory.
    pub fn clone_destination(&self) -> PathBuf {
        self.clone_destination
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Entity store options derived from settings.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            auto_create_group: self.auto_create_group,
        }
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: Settings = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on path fields.
        settings.database_path = settings
            .database_path
            .take()
            .map(|path| expand_path(&path.to_string_lossy()))
            .transpose()?;
        settings.clone_destination = settings
            .clone_destination
            .take()
            .map(|path| expand_path(&path.to_string_lossy()))
            .transpose()?;

        Ok(settings)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

fn env_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(value)) => Some(value.to_string_lossy().into_owned()),
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var: var.into(),
            value: value.into(),
        }),
    }
}

fn expand_path(value: &str) -> Result<PathBuf> {
    Ok(PathBuf::from(
        shellexpand::full(value)
            .map_err(ConfigError::ShellExpansion)?
            .into_owned(),
    ))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read settings file.
    #[error("failed to read settings at {:?}", .path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<VarError>),

    /// Boolean environment override has bogus value.
    #[error("{var} expects a boolean, got {value:?}")]
    InvalidBool { var: String, value: String },

    /// Default locations cannot be determined.
    #[error(transparent)]
    NoWayHome(#[from] NoWayHome),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
