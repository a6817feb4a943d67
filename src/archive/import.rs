// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Archive import.
//!
//! Walks every member of an uploaded archive in archive order, figures out
//! which catalog entry it belongs to, and overwrites that entry's file with
//! the member's bytes. Directory markers and the manifest are skipped
//! silently. Anything else that cannot be imported is counted as skipped and
//! explained in the report.

use crate::{
    access::HomeLocator,
    archive::{matcher::NameMatcher, ArchiveError, Result, MANIFEST_NAME},
    manager::{ConfigManager, ManagerError},
};

use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use tracing::{debug, info, instrument, warn};
use zip::ZipArchive;

/// Outcome of an import.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ImportReport {
    /// Members written to a managed file.
    #[serde(rename = "importedFiles")]
    pub imported: usize,

    /// Members that could not be imported.
    #[serde(rename = "skippedFiles")]
    pub skipped: usize,

    /// One message per skipped member, in archive order.
    pub errors: Vec<String>,

    /// Human readable summary of the counts.
    pub message: String,
}

impl ImportReport {
    fn skip(&mut self, error: MemberError) {
        warn!("{error}");
        self.errors.push(error.to_string());
        self.skipped += 1;
    }

    fn finish(mut self) -> Self {
        self.message = format!(
            "import finished: {} imported, {} skipped",
            self.imported, self.skipped
        );
        self
    }
}

/// Reasons a single archive member is skipped.
///
/// Never escalated past the import call. Only ever recorded in the
/// [`ImportReport`].
#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    /// Member cannot be opened.
    #[error("cannot open archive member {name}: {source}")]
    Open {
        #[source]
        source: zip::result::ZipError,
        name: String,
    },

    /// Member content cannot be read.
    #[error("cannot read archive member {name}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        name: String,
    },

    /// Member is not nested under a category folder.
    #[error("archive member {name} is not inside a category folder")]
    PathFormat { name: String },

    /// No catalog entry matches member's file name.
    #[error("no matching managed file for {candidate}")]
    NoMatch { candidate: String },

    /// Matched managed file cannot be written.
    #[error("failed to update {file}: {source}")]
    Write {
        #[source]
        source: ManagerError,
        file: String,
    },
}

/// Import ZIP archive over the managed files.
///
/// Each member lands in the catalog entry that `matcher` picks for the last
/// segment of its path, fully replacing that file's content.
///
/// # Errors
///
/// - Return [`ArchiveError::Unreadable`] if the archive container itself
///   cannot be parsed. Problems with individual members never fail the call.
#[instrument(skip(manager, matcher, bytes), fields(size = bytes.len()), level = "debug")]
pub fn import<H, M>(manager: &ConfigManager<H>, matcher: &M, bytes: &[u8]) -> Result<ImportReport>
where
    H: HomeLocator,
    M: NameMatcher + ?Sized,
{
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(ArchiveError::Unreadable)?;
    let mut report = ImportReport::default();

    for index in 0..archive.len() {
        let Some(name) = archive.name_for_index(index).map(str::to_owned) else {
            continue;
        };

        // INVARIANT: Directory markers and the manifest are skipped before
        //   the member is opened, so they never count as skipped.
        if is_directory_marker(&name) || name.ends_with(MANIFEST_NAME) {
            debug!("skip {name:?}");
            continue;
        }

        let mut member = match archive.by_index(index) {
            Ok(member) => member,
            Err(err) => {
                report.skip(MemberError::Open { source: err, name });
                continue;
            }
        };

        let mut content = Vec::new();
        if let Err(err) = member.read_to_end(&mut content) {
            report.skip(MemberError::Read { source: err, name });
            continue;
        }

        let segments = name.split('/').collect::<Vec<_>>();
        if segments.len() < 2 {
            report.skip(MemberError::PathFormat { name });
            continue;
        }

        // INVARIANT: Only the last path segment takes part in matching.
        let candidate = segments[segments.len() - 1];
        let Some(entry) = matcher.find(candidate, manager.entries()) else {
            report.skip(MemberError::NoMatch {
                candidate: candidate.to_string(),
            });
            continue;
        };

        debug!("import {name:?} into {}", entry.id);
        if let Err(err) = manager.update_entry(entry, &content) {
            report.skip(MemberError::Write {
                source: err,
                file: entry.name.clone(),
            });
            continue;
        }

        report.imported += 1;
    }

    let report = report.finish();
    info!("{}", report.message);

    Ok(report)
}

fn is_directory_marker(name: &str) -> bool {
    name.ends_with('/') || name.ends_with('\\')
}
