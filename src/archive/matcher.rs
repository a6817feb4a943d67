// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Match archive member names to catalog entries.
//!
//! An imported archive only tells us a bare file name per member, e.g.,
//! `.bashrc` out of `Shell/.bashrc`. Matching decides which catalog entry, if
//! any, that name stands for. Matchers are pure: a candidate name and the
//! catalog entries go in, at most one entry comes out.
//!
//! # Ambiguity
//!
//! Loose matching can make one candidate fit several entries. Ties are always
//! broken by catalog declaration order, never by name, so the same archive
//! imports the same way every time.

use crate::{archive::sanitize_file_name, catalog::CatalogEntry};

use serde::{Deserialize, Serialize};

/// Match a candidate file name to a catalog entry.
pub trait NameMatcher: Send + Sync + 'static {
    /// Find the entry that candidate name stands for.
    fn find<'c>(&self, candidate: &str, entries: &'c [CatalogEntry]) -> Option<&'c CatalogEntry>;
}

/// Match display names exactly.
///
/// Compares against both the raw display name and its sanitized form, so
/// that names rewritten by export still come back home.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactName;

impl NameMatcher for ExactName {
    fn find<'c>(&self, candidate: &str, entries: &'c [CatalogEntry]) -> Option<&'c CatalogEntry> {
        if candidate.is_empty() {
            return None;
        }

        entries
            .iter()
            .find(|entry| entry.name == candidate || sanitize_file_name(&entry.name) == candidate)
    }
}

/// Match display names by substring containment in either direction.
///
/// Tolerates prefix and suffix drift such as a dropped leading dot
/// ("bashrc") or an archive tool's renaming (".bashrc (1)"). An exact match
/// anywhere in the catalog still wins over an earlier containment match.
/// Otherwise ".gitconfig" would swallow every "config".
#[derive(Debug, Default, Clone, Copy)]
pub struct Containment;

impl NameMatcher for Containment {
    fn find<'c>(&self, candidate: &str, entries: &'c [CatalogEntry]) -> Option<&'c CatalogEntry> {
        if candidate.is_empty() {
            return None;
        }

        ExactName.find(candidate, entries).or_else(|| {
            entries.iter().find(|entry| {
                !entry.name.is_empty()
                    && (candidate.contains(entry.name.as_str())
                        || entry.name.contains(candidate))
            })
        })
    }
}

/// Configurable choice of [`NameMatcher`].
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Use [`Containment`].
    #[default]
    Containment,

    /// Use [`ExactName`].
    Exact,
}

impl NameMatcher for MatchStrategy {
    fn find<'c>(&self, candidate: &str, entries: &'c [CatalogEntry]) -> Option<&'c CatalogEntry> {
        match self {
            Self::Containment => Containment.find(candidate, entries),
            Self::Exact => ExactName.find(candidate, entries),
        }
    }
}
