//! Overlay filesystem
//!
//! Combines an ordered list of mounted stores into one read-only view.
//! Every lookup scans the mounts in the order they were added and the
//! first mount that has the path wins.

use crate::config::VfsConfig;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::{DirectoryHandle, FileStat, InputStream, SingleRootStore, Store, StoreOptions};

/// Lifecycle of an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Accepting mounts and serving lookups
    Open,
    /// Torn down; every mount has been released
    Closed,
}

/// Union of mounted stores with first-mount-wins resolution.
///
/// Mounting the same root twice keeps both entries; the earlier one always
/// shadows the later one. There is no way to remove a single mount.
///
/// Lookups take `&self` and the overlay is `Send + Sync`, so once setup is
/// done it can be shared (e.g. behind an `Arc`) by concurrent readers.
/// `mount` and `close` take `&mut self` and therefore cannot overlap a lookup.
pub struct OverlayFileSystem {
    /// Mounted stores, in resolution order
    mounts: Vec<Box<dyn Store>>,
    /// Options applied to roots created by `mount`
    options: StoreOptions,
    state: OverlayState,
    /// Root reported by the overlay itself through the `Store` trait
    root: PathBuf,
}

impl OverlayFileSystem {
    /// Create an empty overlay
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            mounts: Vec::new(),
            options,
            state: OverlayState::Open,
            root: PathBuf::new(),
        }
    }

    /// Build an overlay and mount every root listed in `config`, in order
    pub fn from_config(config: &VfsConfig) -> Result<Self> {
        let mut overlay = Self::with_options(config.store_options());
        for root in &config.mounts {
            overlay.mount(root)?;
        }
        Ok(overlay)
    }

    /// Append a directory root at the lowest precedence.
    ///
    /// The root is not checked for existence until it is first queried.
    pub fn mount(&mut self, root: impl Into<PathBuf>) -> Result<()> {
        self.ensure_open()?;
        let store = SingleRootStore::new(root, self.options)?;
        debug!("Mounting {:?} at position {}", store.root(), self.mounts.len());
        self.mounts.push(Box::new(store));
        Ok(())
    }

    /// Append an arbitrary store at the lowest precedence
    pub fn mount_store(&mut self, store: Box<dyn Store>) -> Result<()> {
        self.ensure_open()?;
        debug!("Mounting store {:?} at position {}", store.root(), self.mounts.len());
        self.mounts.push(store);
        Ok(())
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == OverlayState::Open
    }

    /// Number of live mounts
    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// Roots of every mount, in resolution order (duplicates included)
    pub fn mount_roots(&self) -> Vec<PathBuf> {
        self.mounts.iter().map(|m| m.root().to_path_buf()).collect()
    }

    /// Whether `root` has been mounted at least once
    pub fn is_mounted(&self, root: &Path) -> bool {
        self.mounts.iter().any(|m| m.root() == root)
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            OverlayState::Open => Ok(()),
            OverlayState::Closed => Err(Error::Closed),
        }
    }

    /// First mount holding `path`, together with its metadata
    fn find(&self, path: &Path) -> Result<Option<(&dyn Store, FileStat)>> {
        self.ensure_open()?;
        for (index, mount) in self.mounts.iter().enumerate() {
            if let Some(stat) = mount.stat(path) {
                trace!("{:?} found in mount {} ({:?})", path, index, mount.root());
                return Ok(Some((mount.as_ref(), stat)));
            }
        }
        trace!("{:?} not found in any of {} mounts", path, self.mounts.len());
        Ok(None)
    }

    /// Metadata from the first mount holding `path`; `None` if no mount has it
    pub fn stat(&self, path: &Path) -> Result<Option<FileStat>> {
        Ok(self.find(path)?.map(|(_, stat)| stat))
    }

    pub fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.find(path)?.is_some())
    }

    /// Open `path` through the first mount holding it.
    ///
    /// `Ok(None)` means no mount has the path. Once a mount is chosen, any
    /// failure to open it is returned as-is; later mounts are not tried.
    pub fn open_for_input(&self, path: &Path) -> Result<Option<InputStream>> {
        match self.find(path)? {
            Some((mount, _)) => mount.open_for_input(path).map(Some),
            None => Ok(None),
        }
    }

    /// Root of the first mount holding `path`.
    ///
    /// A nested overlay answers with the root of its own winning mount.
    pub fn containing_dir(&self, path: &Path) -> Result<Option<PathBuf>> {
        self.ensure_open()?;
        Ok(self.mounts.iter().find_map(|mount| mount.containing_dir(path)))
    }

    /// Whether some mount can list `path` as a directory
    pub fn is_dir(&self, path: &Path) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.mounts.iter().any(|mount| mount.is_directory(path)))
    }

    /// Open the directory `path` in the first mount where it is a directory.
    ///
    /// Mounts that hold a file of that name are skipped, so a file never
    /// hides a directory further down.
    pub fn open_directory(&self, path: &Path) -> Result<Option<DirectoryHandle>> {
        self.ensure_open()?;
        for mount in &self.mounts {
            if mount.is_directory(path) {
                return mount.open_directory(path).map(Some);
            }
        }
        Ok(None)
    }

    /// Names visible under directory `path` across all mounts.
    ///
    /// Each name appears once; earlier mounts shadow later ones. Mounts
    /// without the directory are skipped. The result is sorted.
    pub fn list_union(&self, path: &Path) -> Result<Vec<OsString>> {
        self.ensure_open()?;
        let mut seen = HashSet::new();
        let mut names = Vec::new();

        for mount in &self.mounts {
            if !mount.is_directory(path) {
                continue;
            }
            for name in mount.open_directory(path)? {
                let name = name?;
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Release every mount and move to `Closed`.
    ///
    /// Returns how many mounts were released. Closing an already closed
    /// overlay does nothing and returns 0.
    pub fn close(&mut self) -> usize {
        if self.state == OverlayState::Closed {
            return 0;
        }
        let released = self.mounts.len();
        self.mounts.clear();
        self.state = OverlayState::Closed;
        debug!("Overlay closed, released {} mounts", released);
        released
    }
}

impl Default for OverlayFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OverlayFileSystem {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for OverlayFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayFileSystem")
            .field("mounts", &self.mount_roots())
            .field("state", &self.state)
            .finish()
    }
}

/// The overlay as a plain store.
///
/// Misses become `Error::NotFound` here since the trait has no absent
/// result for opens.
impl Store for OverlayFileSystem {
    fn root(&self) -> &Path {
        &self.root
    }

    fn stat(&self, path: &Path) -> Option<FileStat> {
        OverlayFileSystem::stat(self, path).ok().flatten()
    }

    fn open_for_input(&self, path: &Path) -> Result<InputStream> {
        OverlayFileSystem::open_for_input(self, path)?
            .ok_or_else(|| Error::NotFound(path.display().to_string()))
    }

    fn open_directory(&self, path: &Path) -> Result<DirectoryHandle> {
        OverlayFileSystem::open_directory(self, path)?
            .ok_or_else(|| Error::NotFound(path.display().to_string()))
    }

    fn containing_dir(&self, path: &Path) -> Option<PathBuf> {
        OverlayFileSystem::containing_dir(self, path).ok().flatten()
    }

    fn is_directory(&self, path: &Path) -> bool {
        OverlayFileSystem::is_dir(self, path).unwrap_or(false)
    }
}
