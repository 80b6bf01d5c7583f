//! Entry metadata reported by stores

use std::fs;
use std::time::SystemTime;

/// Kind of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    /// Devices, fifos, sockets
    Other,
}

impl From<fs::FileType> for EntryKind {
    fn from(ft: fs::FileType) -> Self {
        if ft.is_file() {
            EntryKind::File
        } else if ft.is_dir() {
            EntryKind::Directory
        } else if ft.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Other
        }
    }
}

/// Metadata for a resolved entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub kind: EntryKind,
    /// Size in bytes (as reported by the driver; 0 is valid for directories)
    pub size: u64,
    /// Last modification time, if the driver supplies one
    pub modified: Option<SystemTime>,
    pub readonly: bool,
}

impl FileStat {
    pub fn from_metadata(meta: &fs::Metadata) -> Self {
        Self {
            kind: EntryKind::from(meta.file_type()),
            size: meta.len(),
            modified: meta.modified().ok(),
            readonly: meta.permissions().readonly(),
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}
