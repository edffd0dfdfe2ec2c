// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Target resolution.
//!
//! Users name things on the command line with bare tokens. A token may name a
//! group, a repository, or both at once, since the two namespaces overlap. A
//! token of the form "group/repository" names one relation. Resolution turns
//! a token into a [`Target`] that records which shape the token has in the
//! current store.
//!
//! # Shape Before Validity
//!
//! The [kind](TargetKind) of a target is assigned before its validity is
//! known. A compound token is always tagged [`TargetKind::GroupAndRepo`],
//! even if the group, the repository, or the relation between them does not
//! exist. The problem is reported separately through [`Target::error`]. This
//! lets a move destination keep its shape even when the exact pairing has not
//! been made yet.

use crate::store::Store;

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Separator between group and repository in compound tokens.
pub const SEPARATOR: char = '/';

/// Shape of a resolved token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Existing group.
    Group,

    /// Existing repository.
    Repository,

    /// Compound "group/repository" reference.
    GroupAndRepo,

    /// Neither group nor repository exists yet.
    GroupOrRepo,

    /// Ambiguous or unresolvable token.
    Unknown,
}

impl TargetKind {
    /// Check if target can act as a group destination.
    pub fn is_group_like(self) -> bool {
        matches!(self, Self::Group | Self::GroupOrRepo)
    }
}

impl Display for TargetKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Group => "group",
            Self::Repository => "repository",
            Self::GroupAndRepo => "group/repository",
            Self::GroupOrRepo => "group or repository",
            Self::Unknown => "unknown",
        };
        fmt.write_str(name)
    }
}

/// Classified interpretation of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Shape of the token.
    pub kind: TargetKind,

    /// Group named by the token, empty if none.
    pub group_name: String,

    /// Repository named by the token, empty if none.
    pub repository_name: String,

    /// Token as given by the user.
    pub original: String,

    /// Problem found while resolving, independent of the kind.
    pub error: Option<TargetError>,
}

impl Target {
    /// Check that resolution found no problem.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Problem found while resolving, if any.
    pub fn error(&self) -> Option<&TargetError> {
        self.error.as_ref()
    }

    fn new(
        kind: TargetKind,
        original: &str,
        group_name: &str,
        repository_name: &str,
        error: Option<TargetError>,
    ) -> Self {
        Self {
            kind,
            group_name: group_name.into(),
            repository_name: repository_name.into(),
            original: original.into(),
            error,
        }
    }
}

impl Display for Target {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(&self.original)
    }
}

/// Classify token against current store contents.
///
/// Performs read-only lookups, so it can be called any number of times in
/// any order.
pub fn resolve(token: &str, store: &Store) -> Target {
    match token.split_once(SEPARATOR) {
        Some((group, repo)) => resolve_compound(token, group, repo, store),
        None => resolve_single(token, store),
    }
}

fn resolve_compound(token: &str, group: &str, repo: &str, store: &Store) -> Target {
    let error = match (store.has_group(group), store.has_repository(repo)) {
        (false, false) => {
            return Target::new(
                TargetKind::Unknown,
                token,
                group,
                repo,
                Some(TargetError::NotFound {
                    group: group.into(),
                    repository: repo.into(),
                }),
            );
        }
        (false, true) => Some(TargetError::GroupNotFound {
            group: group.into(),
        }),
        (true, false) => Some(TargetError::RepositoryNotFound {
            repository: repo.into(),
        }),
        (true, true) if !store.has_relation(group, repo) => Some(TargetError::NoRelation {
            group: group.into(),
            repository: repo.into(),
        }),
        (true, true) => None,
    };

    Target::new(TargetKind::GroupAndRepo, token, group, repo, error)
}

fn resolve_single(token: &str, store: &Store) -> Target {
    match (store.has_group(token), store.has_repository(token)) {
        (true, true) => Target::new(
            TargetKind::Unknown,
            token,
            token,
            token,
            Some(TargetError::Ambiguous {
                name: token.into(),
            }),
        ),
        (true, false) => Target::new(TargetKind::Group, token, token, "", None),
        (false, true) => Target::new(TargetKind::Repository, token, "", token, None),
        (false, false) => Target::new(TargetKind::GroupOrRepo, token, token, token, None),
    }
}

/// Target resolution error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    /// Neither part of a compound token exists.
    #[error("{group}: group not found, {repository}: repository not found")]
    NotFound { group: String, repository: String },

    /// Group part of a compound token does not exist.
    #[error("{group}: group not found")]
    GroupNotFound { group: String },

    /// Repository part of a compound token does not exist.
    #[error("{repository}: repository not found")]
    RepositoryNotFound { repository: String },

    /// Compound token names an unlinked pair.
    #[error("{group}/{repository}: repository is not in the group")]
    NoRelation { group: String, repository: String },

    /// Token names both a group and a repository.
    #[error("{name}: exists as both a group and a repository")]
    Ambiguous { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn fixture() -> Store {
        let mut store = Store::default();
        for group in ["group1", "group2"] {
            store.create_group(group, None, false).unwrap();
        }
        for repo in ["repo1", "repo2", "nested/repo"] {
            store
                .create_repository(repo, format!("/src/{repo}"), None, Vec::new())
                .unwrap();
        }
        store.relate("group1", "repo1");
        store.relate("group2", "nested/repo");

        store
    }

    #[test_case("group1", TargetKind::Group, "group1", ""; "group")]
    #[test_case("repo2", TargetKind::Repository, "", "repo2"; "repository")]
    #[test_case("group1/repo1", TargetKind::GroupAndRepo, "group1", "repo1"; "related pair")]
    #[test_case("fresh", TargetKind::GroupOrRepo, "fresh", "fresh"; "undecided")]
    #[test_case("group2/nested/repo", TargetKind::GroupAndRepo, "group2", "nested/repo"; "split on first separator")]
    #[test]
    fn resolve_valid_tokens(token: &str, kind: TargetKind, group: &str, repo: &str) {
        let store = fixture();
        let target = resolve(token, &store);
        pretty_assertions::assert_eq!(
            target,
            Target {
                kind,
                group_name: group.into(),
                repository_name: repo.into(),
                original: token.into(),
                error: None,
            }
        );
    }

    #[test]
    fn resolve_compound_tags_shape_before_validity() {
        let store = fixture();

        let target = resolve("nope/repo1", &store);
        pretty_assertions::assert_eq!(target.kind, TargetKind::GroupAndRepo);
        pretty_assertions::assert_eq!(
            target.error,
            Some(TargetError::GroupNotFound {
                group: "nope".into()
            })
        );

        let target = resolve("group1/nope", &store);
        pretty_assertions::assert_eq!(target.kind, TargetKind::GroupAndRepo);
        pretty_assertions::assert_eq!(
            target.error,
            Some(TargetError::RepositoryNotFound {
                repository: "nope".into()
            })
        );

        let target = resolve("group2/repo1", &store);
        pretty_assertions::assert_eq!(target.kind, TargetKind::GroupAndRepo);
        pretty_assertions::assert_eq!(
            target.error,
            Some(TargetError::NoRelation {
                group: "group2".into(),
                repository: "repo1".into(),
            })
        );
    }

    #[test]
    fn resolve_compound_with_nothing_known_is_unknown() {
        let store = fixture();
        let target = resolve("nope/none", &store);
        pretty_assertions::assert_eq!(target.kind, TargetKind::Unknown);
        pretty_assertions::assert_eq!(
            target.error,
            Some(TargetError::NotFound {
                group: "nope".into(),
                repository: "none".into(),
            })
        );
    }

    #[test]
    fn resolve_becomes_ambiguous_once_name_is_shared() {
        let mut store = fixture();
        let target = resolve("group1", &store);
        pretty_assertions::assert_eq!(target.kind, TargetKind::Group);
        assert!(target.is_valid());

        store
            .create_repository("group1", "/src/group1", None, Vec::new())
            .unwrap();
        let target = resolve("group1", &store);
        pretty_assertions::assert_eq!(target.kind, TargetKind::Unknown);
        pretty_assertions::assert_eq!(
            target.error(),
            Some(&TargetError::Ambiguous {
                name: "group1".into()
            })
        );
    }
}
