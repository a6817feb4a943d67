// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Catalog of managed configuration files.
//!
//! Dotkeep never touches arbitrary paths. Everything it can read, write,
//! back up, export, or import is named up front in a __catalog__: a fixed
//! table of well-known configuration files, each grouped under a
//! __category__ that is used for display and for folder naming inside
//! export archives.
//!
//! # Path Templates
//!
//! Catalog entries do not store real paths. They store a __path template__
//! whose leading `~` stands for the home directory of whoever runs dotkeep,
//! e.g., `~/.ssh/config`. Template resolution is left to
//! [`FileAccessor`](crate::access::FileAccessor).
//!
//! # Lifecycle
//!
//! A catalog is built once at start up and only ever shared by reference
//! afterwards. Nothing in dotkeep mutates it.

use serde::{Deserialize, Serialize};

/// Grouping label for catalog entries.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Category {
    /// Stable key referenced by [`CatalogEntry::category`].
    pub id: String,

    /// Human readable name, also used as folder name in export archives.
    pub name: String,

    /// Icon token for front ends.
    pub icon: String,

    /// Color token for front ends.
    pub color: String,

    /// Brief description of what the category groups.
    pub description: String,
}

/// Statically declared identity of one well-known configuration file.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct CatalogEntry {
    /// Stable key, e.g., "bashrc".
    pub id: String,

    /// Display name, e.g., ".bashrc".
    pub name: String,

    /// Path template whose leading `~` is the user's home directory.
    pub path: String,

    /// Identifier of owning [`Category`]. Need not exist in the catalog.
    pub category: String,

    /// Brief description of the file.
    pub description: String,
}

/// Fixed, ordered table of categories and managed files.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Catalog {
    categories: Vec<Category>,
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Construct new catalog from categories and entries in declaration order.
    pub fn new(categories: Vec<Category>, entries: Vec<CatalogEntry>) -> Self {
        Self {
            categories,
            entries,
        }
    }

    /// Catalog of shell, editor, Git, and SSH files found on most Linux hosts.
    pub fn builtin() -> Self {
        let categories = vec![
            category(
                "shell",
                "Shell",
                "Terminal",
                "bg-green-500",
                "Shell environment configuration",
            ),
            category(
                "editor",
                "Editor",
                "FileText",
                "bg-blue-500",
                "Text editor configuration",
            ),
            category(
                "git",
                "Git",
                "GitBranch",
                "bg-orange-500",
                "Git version control configuration",
            ),
            category(
                "ssh",
                "SSH",
                "Key",
                "bg-purple-500",
                "SSH client configuration",
            ),
            category(
                "system",
                "System",
                "Settings",
                "bg-red-500",
                "System level configuration",
            ),
            category(
                "app",
                "Applications",
                "Package",
                "bg-indigo-500",
                "Application configuration",
            ),
        ];

        let entries = vec![
            entry(
                "bashrc",
                ".bashrc",
                "~/.bashrc",
                "shell",
                "Bash shell configuration",
            ),
            entry(
                "zshrc",
                ".zshrc",
                "~/.zshrc",
                "shell",
                "Zsh shell configuration",
            ),
            entry(
                "profile",
                ".profile",
                "~/.profile",
                "shell",
                "Login shell environment variables",
            ),
            entry(
                "gitconfig",
                ".gitconfig",
                "~/.gitconfig",
                "git",
                "Global Git configuration",
            ),
            entry(
                "vimrc",
                ".vimrc",
                "~/.vimrc",
                "editor",
                "Vim editor configuration",
            ),
            entry(
                "sshconfig",
                "config",
                "~/.ssh/config",
                "ssh",
                "SSH client configuration",
            ),
        ];

        Self::new(categories, entries)
    }

    /// List categories in declaration order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// List entries in declaration order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Find entry by its identifier.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError::UnknownFile`] if no entry has that identifier.
    pub fn find_entry(&self, id: impl AsRef<str>) -> Result<&CatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.id == id.as_ref())
            .ok_or_else(|| CatalogError::UnknownFile(id.as_ref().to_string()))
    }

    /// Find category by its identifier.
    pub fn find_category(&self, id: impl AsRef<str>) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.id == id.as_ref())
    }
}

fn category(id: &str, name: &str, icon: &str, color: &str, description: &str) -> Category {
    Category {
        id: id.into(),
        name: name.into(),
        icon: icon.into(),
        color: color.into(),
        description: description.into(),
    }
}

fn entry(id: &str, name: &str, path: &str, category: &str, description: &str) -> CatalogEntry {
    CatalogEntry {
        id: id.into(),
        name: name.into(),
        path: path.into(),
        category: category.into(),
        description: description.into(),
    }
}

/// Catalog lookup error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// No catalog entry carries the requested identifier.
    #[error("file not found: {0}")]
    UnknownFile(String),
}

/// Friendly result alias :3
pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
