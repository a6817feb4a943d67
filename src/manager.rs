// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Managed file service.
//!
//! Joins the [`Catalog`] with live file system facts from the
//! [`FileAccessor`]. Both the HTTP layer and the archive engines go through
//! here, so there is exactly one code path per capability.
//!
//! # Listing Versus Lookup
//!
//! Listing only surfaces entries whose files currently exist, and never
//! reads file content. Looking up a single entry by identifier reads its
//! content, and treats an absent file as an error instead of an empty
//! result.

use crate::{
    access::{AccessError, FileAccessor, HomeLocator, UserHome},
    catalog::{Catalog, CatalogEntry, CatalogError, Category},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Catalog entry joined with live file system facts.
///
/// Recomputed on every request, never persisted.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFile {
    pub id: String,
    pub name: String,
    pub path: String,
    pub category: String,
    pub description: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub size: u64,
    pub is_symlink: bool,
    pub backup_exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Outcome of a timestamped backup.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupReceipt {
    pub message: String,
    pub backup_path: PathBuf,
}

/// Service over catalog and file accessor.
#[derive(Debug)]
pub struct ConfigManager<H = UserHome>
where
    H: HomeLocator,
{
    catalog: Catalog,
    accessor: FileAccessor<H>,
}

impl<H> ConfigManager<H>
where
    H: HomeLocator,
{
    /// Construct new manager.
    pub fn new(catalog: Catalog, accessor: FileAccessor<H>) -> Self {
        Self { catalog, accessor }
    }

    /// Catalog being managed.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// File accessor being used.
    pub fn accessor(&self) -> &FileAccessor<H> {
        &self.accessor
    }

    /// List all categories in declaration order.
    pub fn categories(&self) -> &[Category] {
        self.catalog.categories()
    }

    /// List all catalog entries in declaration order, existing or not.
    pub fn entries(&self) -> &[CatalogEntry] {
        self.catalog.entries()
    }

    /// List managed files that currently exist, without content.
    ///
    /// # Errors
    ///
    /// - Return [`ManagerError::Access`] if home directory cannot be
    ///   determined.
    pub fn list_files(&self) -> Result<Vec<ResolvedFile>> {
        let mut files = Vec::new();
        for entry in self.catalog.entries() {
            match self.resolve_entry(entry, false) {
                Ok(file) => files.push(file),
                Err(ManagerError::Access(AccessError::NotFound { path })) => {
                    debug!("skip absent file {:?}", path.display());
                }
                Err(err) => return Err(err),
            }
        }

        Ok(files)
    }

    /// Look up managed file by identifier, with content.
    ///
    /// # Errors
    ///
    /// - Return [`ManagerError::Catalog`] if identifier is not in catalog.
    /// - Return [`ManagerError::Access`] if file is absent or unreadable.
    pub fn get_file(&self, id: impl AsRef<str>) -> Result<ResolvedFile> {
        let entry = self.catalog.find_entry(id)?;
        self.resolve_entry(entry, true)
    }

    /// Join catalog entry with live facts about its file right now.
    ///
    /// # Errors
    ///
    /// - Return [`ManagerError::Access`] if file is absent, or if content is
    ///   requested but cannot be read.
    pub fn resolve_entry(&self, entry: &CatalogEntry, with_content: bool) -> Result<ResolvedFile> {
        let path = self.accessor.resolve_path(entry)?;

        let content = if with_content {
            let bytes = self.accessor.read(&path)?;
            Some(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            None
        };

        // INVARIANT: Stat after reading, so facts describe the content we hold.
        let stat = self.accessor.stat(&path);
        if !stat.exists {
            return Err(AccessError::NotFound { path }.into());
        }

        Ok(ResolvedFile {
            id: entry.id.clone(),
            name: entry.name.clone(),
            path: entry.path.clone(),
            category: entry.category.clone(),
            description: entry.description.clone(),
            last_modified: stat.mod_time,
            size: stat.size_bytes,
            is_symlink: stat.is_symlink,
            backup_exists: self.accessor.backup_exists(&path),
            content,
        })
    }

    /// Read raw bytes of catalog entry's file.
    ///
    /// # Errors
    ///
    /// - Return [`ManagerError::Access`] if file is absent or unreadable.
    pub fn read_entry(&self, entry: &CatalogEntry) -> Result<Vec<u8>> {
        let path = self.accessor.resolve_path(entry)?;
        Ok(self.accessor.read(path)?)
    }

    /// Replace content of managed file by identifier.
    ///
    /// # Errors
    ///
    /// - Return [`ManagerError::Catalog`] if identifier is not in catalog.
    /// - Return [`ManagerError::Access`] if file cannot be written.
    pub fn update_file(&self, id: impl AsRef<str>, content: impl AsRef<[u8]>) -> Result<()> {
        let entry = self.catalog.find_entry(id)?;
        self.update_entry(entry, content)
    }

    /// Replace content of catalog entry's file.
    ///
    /// # Errors
    ///
    /// - Return [`ManagerError::Access`] if file cannot be written.
    #[instrument(skip(self, entry, content), fields(id = %entry.id), level = "debug")]
    pub fn update_entry(&self, entry: &CatalogEntry, content: impl AsRef<[u8]>) -> Result<()> {
        let path = self.accessor.resolve_path(entry)?;
        self.accessor.write(&path, content)?;
        info!("update {:?}", path.display());

        Ok(())
    }

    /// Create timestamped backup of managed file by identifier.
    ///
    /// # Errors
    ///
    /// - Return [`ManagerError::Catalog`] if identifier is not in catalog.
    /// - Return [`ManagerError::Access`] if file is absent, or backup cannot
    ///   be made.
    pub fn backup_file(&self, id: impl AsRef<str>) -> Result<BackupReceipt> {
        let entry = self.catalog.find_entry(id)?;
        let path = self.accessor.resolve_path(entry)?;
        let backup_path = self.accessor.create_timestamped_backup(&path)?;

        Ok(BackupReceipt {
            message: "backup created".into(),
            backup_path,
        })
    }
}

/// Managed file service error types.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// Catalog lookup fails.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// File access fails.
    #[error(transparent)]
    Access(#[from] AccessError),
}

impl ManagerError {
    /// Failure boils down to something that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Catalog(CatalogError::UnknownFile(_)) | Self::Access(AccessError::NotFound { .. })
        )
    }
}

/// Friendly result alias :3
pub type Result<T, E = ManagerError> = std::result::Result<T, E>;
