//! Read-only store contract
//!
//! Both a single backing root and the overlay expose this surface, so code
//! written against one can be pointed at the other.

use crate::error::Result;
use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::FileStat;

/// Byte source behind an [`InputStream`]
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Read-only, path-based storage
pub trait Store: Send + Sync {
    /// Root this store resolves paths against
    fn root(&self) -> &Path;

    /// Look up an entry. Absence is `None`, never an error.
    fn stat(&self, path: &Path) -> Option<FileStat>;

    /// Open a file for reading, positioned at offset 0
    fn open_for_input(&self, path: &Path) -> Result<InputStream>;

    /// Open a directory for lazy iteration over entry names
    fn open_directory(&self, path: &Path) -> Result<DirectoryHandle>;

    /// Directory a caller should resolve siblings of `path` against, if
    /// this store holds `path`
    fn containing_dir(&self, path: &Path) -> Option<PathBuf> {
        self.stat(path).map(|_| self.root().to_path_buf())
    }

    /// Whether `open_directory(path)` would find a directory
    fn is_directory(&self, path: &Path) -> bool {
        self.stat(path).is_some_and(|s| s.is_dir())
    }
}

/// An open, caller-owned file stream.
///
/// The underlying handle is released when the stream is dropped.
pub struct InputStream {
    /// Fully resolved path the stream was opened from
    path: PathBuf,
    /// Metadata captured at open time
    stat: FileStat,
    reader: Box<dyn ReadSeek>,
}

impl InputStream {
    pub fn new(path: PathBuf, stat: FileStat, reader: Box<dyn ReadSeek>) -> Self {
        Self { path, stat, reader }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stat(&self) -> &FileStat {
        &self.stat
    }

    /// Read the remainder of the stream
    pub fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.reader.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Read the remainder of the stream as UTF-8
    pub fn read_to_string(&mut self) -> io::Result<String> {
        let mut content = String::new();
        self.reader.read_to_string(&mut content)?;
        Ok(content)
    }
}

impl Read for InputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Seek for InputStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.reader.seek(pos)
    }
}

impl fmt::Debug for InputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputStream")
            .field("path", &self.path)
            .field("stat", &self.stat)
            .finish()
    }
}

/// Lazy sequence of entry names in an opened directory
pub struct DirectoryHandle {
    path: PathBuf,
    entries: Box<dyn Iterator<Item = Result<OsString>> + Send>,
}

impl DirectoryHandle {
    pub fn new<I>(path: PathBuf, entries: I) -> Self
    where
        I: Iterator<Item = Result<OsString>> + Send + 'static,
    {
        Self {
            path,
            entries: Box::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain the handle into a sorted name list
    pub fn collect_names(self) -> Result<Vec<OsString>> {
        let mut names = self.collect::<Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }
}

impl Iterator for DirectoryHandle {
    type Item = Result<OsString>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }
}

impl fmt::Debug for DirectoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryHandle")
            .field("path", &self.path)
            .finish()
    }
}
