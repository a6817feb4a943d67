// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Archive export.

use crate::{
    access::HomeLocator,
    archive::{sanitize_file_name, ArchiveError, Result, FALLBACK_CATEGORY, MANIFEST_NAME},
    catalog::Category,
    manager::{ConfigManager, ResolvedFile},
};

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use tracing::{debug, info, instrument, warn};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// Layout of [`Manifest::export_time`].
pub const EXPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// JSON summary embedded at the root of every export.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Local time of export, second resolution.
    pub export_time: String,

    /// Number of managed files actually written to the archive.
    pub total_files: usize,

    /// Full category listing of the exporting catalog.
    pub categories: Vec<Category>,

    /// Metadata of every included file, without content.
    pub files: Vec<ResolvedFile>,
}

/// Export every readable managed file into a ZIP archive.
///
/// Files that are absent or fail to read are left out without failing the
/// export. Manifest rows are taken right after each file is read, so they
/// describe exactly what went into the archive.
///
/// # Errors
///
/// - Return [`ArchiveError::Assemble`] or [`ArchiveError::Member`] if the
///   archive itself cannot be written.
/// - Return [`ArchiveError::Manifest`] if manifest cannot be encoded.
#[instrument(skip(manager), level = "debug")]
pub fn export<H>(manager: &ConfigManager<H>) -> Result<Vec<u8>>
where
    H: HomeLocator,
{
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    let catalog = manager.catalog();
    let mut files = Vec::new();

    for entry in catalog.entries() {
        let content = match manager.read_entry(entry) {
            Ok(content) => content,
            Err(err) if err.is_not_found() => {
                debug!("skip absent file {}", entry.id);
                continue;
            }
            Err(err) => {
                warn!("skip unreadable file {}: {err}", entry.id);
                continue;
            }
        };

        let file = match manager.resolve_entry(entry, false) {
            Ok(file) => file,
            Err(err) => {
                warn!("skip file {} that vanished mid-export: {err}", entry.id);
                continue;
            }
        };

        let folder = catalog
            .find_category(&entry.category)
            .map_or(FALLBACK_CATEGORY, |category| category.name.as_str());
        let name = format!("{folder}/{}", sanitize_file_name(&entry.name));

        debug!("add {name:?} to archive");
        if let Err(err) = zip.start_file(name.as_str(), options) {
            warn!("skip file {} that cannot be added as {name:?}: {err}", entry.id);
            continue;
        }
        zip.write_all(&content)
            .map_err(|err| ArchiveError::Member { source: err, name })?;
        files.push(file);
    }

    let manifest = Manifest {
        export_time: Local::now().format(EXPORT_TIME_FORMAT).to_string(),
        total_files: files.len(),
        categories: catalog.categories().to_vec(),
        files,
    };

    zip.start_file(MANIFEST_NAME, options)
        .map_err(ArchiveError::Assemble)?;
    zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())
        .map_err(|err| ArchiveError::Member {
            source: err,
            name: MANIFEST_NAME.into(),
        })?;

    let bytes = zip.finish().map_err(ArchiveError::Assemble)?.into_inner();
    info!(
        "exported {} managed files into {} byte archive",
        manifest.total_files,
        bytes.len()
    );

    Ok(bytes)
}
