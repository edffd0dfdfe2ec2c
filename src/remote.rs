// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Git working copy glue.
//!
//! Read remote listings out of existing working copies, and clone new working
//! copies from remote URLs through libgit2. Nothing in here touches the
//! registry itself. Callers register the results through
//! [`Store`](crate::store::Store).

use crate::model::Remote;

use auth_git2::{GitAuthenticator, Prompter};
use git2::{build::RepoBuilder, Config, FetchOptions, RemoteCallbacks, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, Text};
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument};

/// List remotes configured in working copy.
///
/// Remotes without a URL are skipped.
///
/// # Errors
///
/// - Return [`RemoteError::Git2`] if working copy cannot be opened.
#[instrument(skip(path), level = "debug")]
pub fn find_remotes(path: impl AsRef<Path>) -> Result<Vec<Remote>> {
    debug!("read remotes of {:?}", path.as_ref().display());
    let repository = Repository::open(path.as_ref())?;
    let names = repository.remotes()?;

    let mut remotes = Vec::new();
    for name in names.iter().flatten() {
        let remote = repository.find_remote(name)?;
        if let Some(url) = remote.url() {
            remotes.push(Remote::new(name, url));
        }
    }

    Ok(remotes)
}

/// Derive repository id from the last segment of a remote URL.
///
/// Strips trailing slashes and a ".git" extension, so both
/// "https://blah.org/foo.git" and "git@blah.org:me/foo" yield "foo".
pub fn repository_id_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed
        .rsplit(['/', ':'])
        .next()
        .filter(|segment| !segment.is_empty())?;
    let id = last.strip_suffix(".git").unwrap_or(last);

    (!id.is_empty()).then(|| id.to_string())
}

/// Derive repository id from the directory name of a working copy.
pub fn repository_id_from_path(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}

/// Clone remote repository into destination directory.
///
/// The progress of the clone is displayed through a progress bar. If any
/// credentials are required, the user is prompted for them while the
/// progress bar is suspended.
///
/// Returns path of new working copy.
///
/// # Errors
///
/// - Return [`RemoteError::InvalidUrl`] if no repository id can be derived.
/// - Return [`RemoteError::Git2`] if libgit2 operations fail.
/// - Return [`RemoteError::IndicatifStyleTemplate`] if progress bar style
///   is bogus.
pub fn clone_remote(url: &str, destination: &Path, bar: ProgressBar) -> Result<PathBuf> {
    let id = repository_id_from_url(url).ok_or_else(|| RemoteError::InvalidUrl {
        url: url.to_string(),
    })?;
    let path = destination.join(&id);

    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);
    bar.set_message(url.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));

    let prompter = IndicatifPrompter::new(bar);
    let authenticator = GitAuthenticator::default().set_prompter(prompter.clone());
    let config = Config::open_default()?;

    let mut throttle = Instant::now();
    let mut rc = RemoteCallbacks::new();
    rc.credentials(authenticator.credentials(&config));
    rc.transfer_progress(|progress| {
        let stats = progress.to_owned();
        if throttle.elapsed() > Duration::from_millis(10) {
            throttle = Instant::now();
            prompter.bar.set_length(stats.total_objects() as u64);
            prompter.bar.set_position(stats.received_objects() as u64);
        }
        true
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(rc);
    info!("clone {url} into {:?}", path.display());
    RepoBuilder::new().fetch_options(fo).clone(url, &path)?;
    prompter.bar.finish_and_clear();

    Ok(path)
}

/// Git2 authentication prompter for progress bar.
#[derive(Debug, Clone)]
pub struct IndicatifPrompter {
    pub(crate) bar: ProgressBar,
}

impl IndicatifPrompter {
    /// Construct new progress bar authenticator.
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Prompter for IndicatifPrompter {
    #[instrument(skip(self, url, _config), level = "debug")]
    fn prompt_username_password(
        &mut self,
        url: &str,
        _config: &git2::Config,
    ) -> Option<(String, String)> {
        info!("authentication required at {url}");
        self.bar.suspend(|| -> Option<(String, String)> {
            let username = Text::new("username").prompt().ok()?;
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()?;
            Some((username, password))
        })
    }

    #[instrument(skip(self, username, url, _config), level = "debug")]
    fn prompt_password(
        &mut self,
        username: &str,
        url: &str,
        _config: &git2::Config,
    ) -> Option<String> {
        info!("authentication required at {url} for user {username}");
        self.bar.suspend(|| {
            Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }

    #[instrument(skip(self, ssh_key_path, _config), level = "debug")]
    fn prompt_ssh_key_passphrase(
        &mut self,
        ssh_key_path: &Path,
        _config: &git2::Config,
    ) -> Option<String> {
        info!(
            "authentication required with ssh key at {}",
            ssh_key_path.display()
        );
        self.bar.suspend(|| {
            Password::new("passphrase")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }
}

/// Git glue error types.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// No repository id can be derived from URL.
    #[error("cannot derive repository name from {url:?}")]
    InvalidUrl { url: String },

    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),
}

/// Friendly result alias :3
pub type Result<T, E = RemoteError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("https://blah.org/me/foo.git", Some("foo"); "https with extension")]
    #[test_case("https://blah.org/me/foo/", Some("foo"); "trailing slash")]
    #[test_case("git@blah.org:foo.git", Some("foo"); "scp style")]
    #[test_case("/srv/git/bar", Some("bar"); "local path")]
    #[test_case("https://blah.org/.git", None; "bare extension")]
    #[test_case("", None; "empty")]
    #[test]
    fn derive_repository_id_from_url(url: &str, expect: Option<&str>) {
        pretty_assertions::assert_eq!(repository_id_from_url(url).as_deref(), expect);
    }

    #[test]
    fn derive_repository_id_from_path() {
        pretty_assertions::assert_eq!(repository_id_from_path("/src/foo").as_deref(), Some("foo"));
        pretty_assertions::assert_eq!(repository_id_from_path("/").as_deref(), None);
    }
}
