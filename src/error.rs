//! Error types for enginevfs

use std::fmt;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Why an existing entry could not be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Expected a file, found a directory
    IsDirectory,
    /// Expected a directory, found something else
    NotDirectory,
    /// The driver refused access
    PermissionDenied,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::IsDirectory => write!(f, "is a directory"),
            AccessKind::NotDirectory => write!(f, "not a directory"),
            AccessKind::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

/// Errors produced by stores and the overlay
#[derive(Debug, Error)]
pub enum Error {
    /// No entry at the given path in a single store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entry exists but cannot be opened the way it was asked for
    #[error("Cannot access {path}: {kind}")]
    Access { path: String, kind: AccessKind },

    /// Operation issued after the overlay was torn down
    #[error("Overlay filesystem is closed")]
    Closed,

    /// Mount root is unusable
    #[error("Invalid mount root: {0}")]
    InvalidRoot(String),

    /// Configuration file could not be read or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Classify a raw driver error for `path`.
    ///
    /// Not-found, permission and wrong-kind failures get their own variants,
    /// everything else is kept as `Io`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let display = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => return Error::NotFound(display),
            io::ErrorKind::PermissionDenied => {
                return Error::Access {
                    path: display,
                    kind: AccessKind::PermissionDenied,
                }
            }
            _ => {}
        }

        match err.raw_os_error() {
            Some(libc::EISDIR) => Error::Access {
                path: display,
                kind: AccessKind::IsDirectory,
            },
            Some(libc::ENOTDIR) => Error::Access {
                path: display,
                kind: AccessKind::NotDirectory,
            },
            _ => Error::Io(err),
        }
    }

    /// Build an access error for `path`
    pub fn access(path: &Path, kind: AccessKind) -> Self {
        Error::Access {
            path: path.display().to_string(),
            kind,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_access(&self) -> bool {
        matches!(self, Error::Access { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        let err = Error::from_io(
            Path::new("/a/b"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: /a/b");
    }

    #[test]
    fn test_classify_permission() {
        let err = Error::from_io(
            Path::new("secret"),
            io::Error::new(io::ErrorKind::PermissionDenied, "no"),
        );
        match err {
            Error::Access { kind, .. } => assert_eq!(kind, AccessKind::PermissionDenied),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_errno() {
        let err = Error::from_io(Path::new("dir"), io::Error::from_raw_os_error(libc::EISDIR));
        assert!(err.is_access());
        assert_eq!(err.to_string(), "Cannot access dir: is a directory");

        let err = Error::from_io(Path::new("f"), io::Error::from_raw_os_error(libc::ENOTDIR));
        assert!(matches!(
            err,
            Error::Access {
                kind: AccessKind::NotDirectory,
                ..
            }
        ));
    }

    #[test]
    fn test_other_errors_stay_io() {
        let err = Error::from_io(
            Path::new("x"),
            io::Error::new(io::ErrorKind::Other, "disk on fire"),
        );
        assert!(matches!(err, Error::Io(_)));
    }
}
