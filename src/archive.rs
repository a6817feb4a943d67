// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Archive export and import.
//!
//! Dotkeep can bundle every managed file that currently exists into a single
//! ZIP archive, and it can take such an archive back and write its content
//! over the live files.
//!
//! # Archive Layout
//!
//! Each managed file is placed at `<category name>/<file name>`, where the
//! category name is the display name of the entry's category ("Other" when
//! the entry points at an unknown category), and the file name is the
//! entry's display name with path separators replaced by underscores. A
//! single [`MANIFEST_NAME`] member sits at the root of the archive and
//! describes the export in JSON.
//!
//! ```text
//! Shell/.bashrc
//! Shell/.profile
//! Git/.gitconfig
//! SSH/config
//! manifest.json
//! ```
//!
//! Only nested members are ever considered for import, so the manifest can
//! never be mistaken for a managed file, nor collide with a category folder.
//!
//! # Import Is Best Effort
//!
//! Archives fed back into dotkeep were not necessarily produced by the same
//! catalog, or may have been edited by hand. Import therefore never aborts on
//! a single bad member. Every problem is recorded in the returned
//! [`ImportReport`](import::ImportReport), and only an archive that cannot be
//! opened at all fails the whole call.

pub mod export;
pub mod import;
pub mod matcher;

/// Name of the JSON manifest member written at the root of every export.
pub const MANIFEST_NAME: &str = "manifest.json";

/// Folder used for entries whose category is not in the catalog.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Make display name safe to use as a single archive path segment.
///
/// Path separators are replaced with underscores so that a member can never
/// escape its category folder.
pub fn sanitize_file_name(name: impl AsRef<str>) -> String {
    name.as_ref().replace(['/', '\\'], "_")
}

/// Archive error types.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Archive container cannot be parsed.
    #[error("failed to read archive")]
    Unreadable(#[source] zip::result::ZipError),

    /// Archive container cannot be assembled.
    #[error("failed to write archive")]
    Assemble(#[source] zip::result::ZipError),

    /// Archive member content cannot be written.
    #[error("failed to write archive member {name}")]
    Member {
        #[source]
        source: std::io::Error,
        name: String,
    },

    /// Manifest cannot be encoded.
    #[error(transparent)]
    Manifest(#[from] serde_json::Error),

    /// Catalog listing fails.
    #[error(transparent)]
    Manager(#[from] crate::manager::ManagerError),
}

/// Friendly result alias :3
pub type Result<T, E = ArchiveError> = std::result::Result<T, E>;
