// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Physical access to managed files.
//!
//! Translates catalog path templates into real paths under the user's home
//! directory, and performs the raw file system operations dotkeep needs:
//! stat, read, write, and timestamped copies.
//!
//! # Pitfalls
//!
//! There is no locking and no atomic rename here. Two overlapping writes to
//! the same file race at the file system level and the last writer wins. A
//! crash in the middle of [`FileAccessor::write`] can leave a partially
//! written file behind. Both are accepted for a single-user local tool.

use crate::{catalog::CatalogEntry, path::NoWayHome};

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use std::{
    fs::{self, DirBuilder, OpenOptions},
    io::Write,
    os::unix::fs::{DirBuilderExt, OpenOptionsExt},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, info, instrument};

/// Suffix of the sibling file reported by [`FileAccessor::backup_exists`].
pub const BACKUP_SUFFIX: &str = ".backup";

/// Layout of timestamps appended to backup file names.
pub const BACKUP_STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Locate the home directory that path templates resolve against.
pub trait HomeLocator: Send + Sync + 'static {
    /// Absolute path to home directory, if it can be determined at all.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Home locator chosen at run time.
pub type DynHome = Box<dyn HomeLocator>;

impl HomeLocator for DynHome {
    fn home_dir(&self) -> Option<PathBuf> {
        (**self).home_dir()
    }
}

/// Home directory of the user running the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserHome;

impl HomeLocator for UserHome {
    fn home_dir(&self) -> Option<PathBuf> {
        crate::path::home_dir().ok()
    }
}

/// Home directory pinned to a known path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedHome(PathBuf);

impl FixedHome {
    /// Construct new pinned home directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl HomeLocator for FixedHome {
    fn home_dir(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Live file system facts about a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    /// Path exists, following symbolic links.
    pub exists: bool,

    /// Last modification time of the link target.
    pub mod_time: Option<DateTime<Utc>>,

    /// Size in bytes of the link target.
    pub size_bytes: u64,

    /// Path itself is a symbolic link.
    pub is_symlink: bool,
}

impl FileStat {
    fn absent() -> Self {
        Self {
            exists: false,
            mod_time: None,
            size_bytes: 0,
            is_symlink: false,
        }
    }
}

/// Perform file system operations on behalf of catalog entries.
#[derive(Debug)]
pub struct FileAccessor<H = UserHome>
where
    H: HomeLocator,
{
    home: H,
    last_stamp: Mutex<Option<NaiveDateTime>>,
}

impl<H> FileAccessor<H>
where
    H: HomeLocator,
{
    /// Construct new file accessor.
    pub fn new(home: H) -> Self {
        Self {
            home,
            last_stamp: Mutex::new(None),
        }
    }

    /// Resolve catalog entry's path template into a real path.
    ///
    /// Only a leading `~` is substituted. Everything else in the template is
    /// taken literally.
    ///
    /// # Errors
    ///
    /// - Return [`AccessError::HomeDirUnresolved`] if home directory cannot
    ///   be determined.
    pub fn resolve_path(&self, entry: &CatalogEntry) -> Result<PathBuf> {
        let home = self.home.home_dir().ok_or(NoWayHome)?;
        let home = home.to_string_lossy().into_owned();
        let expanded = shellexpand::tilde_with_context(&entry.path, || Some(home));

        Ok(PathBuf::from(expanded.into_owned()))
    }

    /// Collect live facts about target path.
    ///
    /// Symbolic links are detected without following them, but size and
    /// modification time describe whatever the link points at. Absence is
    /// not an error.
    pub fn stat(&self, path: impl AsRef<Path>) -> FileStat {
        let path = path.as_ref();
        let is_symlink = fs::symlink_metadata(path)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);

        match fs::metadata(path) {
            Ok(meta) => FileStat {
                exists: true,
                mod_time: meta.modified().ok().map(DateTime::<Utc>::from),
                size_bytes: meta.len(),
                is_symlink,
            },
            Err(_) => FileStat {
                is_symlink,
                ..FileStat::absent()
            },
        }
    }

    /// Read entire content of target path.
    ///
    /// # Errors
    ///
    /// - Return [`AccessError::NotFound`] if target path does not exist.
    /// - Return [`AccessError::ReadFailed`] if target path cannot be read.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        fs::read(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                AccessError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                AccessError::ReadFailed {
                    source: err,
                    path: path.to_path_buf(),
                }
            }
        })
    }

    /// Create or overwrite target path with given content.
    ///
    /// New files get mode 0644, and missing parent directories are created
    /// with mode 0700. Existing files keep their current mode.
    ///
    /// # Errors
    ///
    /// - Return [`AccessError::WriteFailed`] if target path cannot be
    ///   written to.
    #[instrument(skip(self, path, content), level = "debug")]
    pub fn write(&self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Result<()> {
        let path = path.as_ref();
        let write_failed = |err| AccessError::WriteFailed {
            source: err,
            path: path.to_path_buf(),
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.exists()) {
            debug!("create missing parent directory {:?}", parent.display());
            DirBuilder::new()
                .recursive(true)
                .mode(0o700)
                .create(parent)
                .map_err(write_failed)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o644)
            .open(path)
            .map_err(write_failed)?;
        file.write_all(content.as_ref()).map_err(write_failed)?;
        debug!("wrote {} bytes to {:?}", content.as_ref().len(), path.display());

        Ok(())
    }

    /// Check for a sibling of target path carrying the plain backup suffix.
    pub fn backup_exists(&self, path: impl AsRef<Path>) -> bool {
        with_suffix(path.as_ref(), BACKUP_SUFFIX).exists()
    }

    /// Copy target path to a timestamped sibling.
    ///
    /// The copy lands at `<path>.backup.<YYYYMMDD-HHMMSS>`. Stamps never go
    /// backwards within one accessor, but two backups in the same second
    /// share a stamp, and the later one overwrites the earlier.
    ///
    /// # Errors
    ///
    /// - Return [`AccessError::NotFound`] if target path does not exist.
    /// - Return [`AccessError::ReadFailed`] if target path cannot be read.
    /// - Return [`AccessError::WriteFailed`] if backup cannot be written.
    #[instrument(skip(self, path), level = "debug")]
    pub fn create_timestamped_backup(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let content = self.read(path)?;
        let stamp = self.next_stamp().format(BACKUP_STAMP_FORMAT);
        let backup_path = with_suffix(path, &format!("{BACKUP_SUFFIX}.{stamp}"));

        self.write(&backup_path, content)?;
        info!("backup {:?} to {:?}", path.display(), backup_path.display());

        Ok(backup_path)
    }

    fn next_stamp(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        let mut last = self
            .last_stamp
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // INVARIANT: Never hand out a stamp older than the previous one.
        let stamp = match *last {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        *last = Some(stamp);

        stamp
    }
}

impl Default for FileAccessor<UserHome> {
    fn default() -> Self {
        Self::new(UserHome)
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// File access error types.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Home directory cannot be determined.
    #[error(transparent)]
    HomeDirUnresolved(#[from] NoWayHome),

    /// Target file does not exist.
    #[error("file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    /// Target file cannot be read from.
    #[error("failed to read file {}", path.display())]
    ReadFailed {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Target file cannot be written to.
    #[error("failed to write file {}", path.display())]
    WriteFailed {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = AccessError> = std::result::Result<T, E>;
