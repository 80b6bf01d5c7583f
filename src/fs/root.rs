//! Single-root store
//!
//! Read-only pass-through to one real directory on disk.

use crate::error::{AccessKind, Error, Result};
use std::fs::{self, File, Metadata};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::{DirectoryHandle, FileStat, InputStream, Store};

/// Options shared by every root a store or overlay creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Stat through symlinks instead of reporting the link itself
    pub follow_symlinks: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
        }
    }
}

/// Store backed by one directory of the host filesystem
#[derive(Debug)]
pub struct SingleRootStore {
    /// Root path of the backing directory
    root: PathBuf,
    options: StoreOptions,
}

impl SingleRootStore {
    /// Create a store for `root`.
    ///
    /// The root is not checked for existence; a missing root simply finds
    /// nothing at lookup time.
    pub fn new(root: impl Into<PathBuf>, options: StoreOptions) -> Result<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(Error::InvalidRoot("mount root must not be empty".to_string()));
        }
        Ok(Self { root, options })
    }

    /// Join a caller path onto the root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            // Strip leading / for joining
            let relative = path.strip_prefix("/").unwrap_or(path);
            self.root.join(relative)
        } else {
            self.root.join(path)
        }
    }

    fn metadata(&self, resolved: &Path) -> io::Result<Metadata> {
        if self.options.follow_symlinks {
            fs::metadata(resolved)
        } else {
            fs::symlink_metadata(resolved)
        }
    }
}

impl Store for SingleRootStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn stat(&self, path: &Path) -> Option<FileStat> {
        let resolved = self.resolve(path);
        match self.metadata(&resolved) {
            Ok(meta) => Some(FileStat::from_metadata(&meta)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                // ENOTDIR on an intermediate component, EACCES on a parent, ...
                warn!("stat {:?} treated as absent: {}", resolved, e);
                None
            }
        }
    }

    fn open_for_input(&self, path: &Path) -> Result<InputStream> {
        let resolved = self.resolve(path);
        let file = File::open(&resolved).map_err(|e| Error::from_io(&resolved, e))?;
        let meta = file.metadata().map_err(|e| Error::from_io(&resolved, e))?;

        // Opening a directory succeeds on unix; refuse it here
        if meta.is_dir() {
            return Err(Error::access(&resolved, AccessKind::IsDirectory));
        }

        Ok(InputStream::new(
            resolved,
            FileStat::from_metadata(&meta),
            Box::new(BufReader::new(file)),
        ))
    }

    fn open_directory(&self, path: &Path) -> Result<DirectoryHandle> {
        let resolved = self.resolve(path);
        let entries = fs::read_dir(&resolved).map_err(|e| Error::from_io(&resolved, e))?;

        let dir = resolved.clone();
        let names = entries.map(move |entry| {
            entry
                .map(|e| e.file_name())
                .map_err(|e| Error::from_io(&dir, e))
        });

        Ok(DirectoryHandle::new(resolved, names))
    }

    fn is_directory(&self, path: &Path) -> bool {
        // read_dir follows links regardless of follow_symlinks
        fs::metadata(self.resolve(path)).is_ok_and(|m| m.is_dir())
    }
}
