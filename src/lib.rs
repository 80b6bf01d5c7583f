//! enginevfs - Read-only overlay virtual filesystem
//!
//! Mount any number of directories, then look files up against the union
//! of them. When several mounts hold the same path, the one mounted first
//! wins.

pub mod config;
pub mod error;
pub mod fs;

pub use config::VfsConfig;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::VfsConfig;
    pub use crate::error::{Error, Result};
    pub use crate::fs::{FileStat, InputStream, OverlayFileSystem, Store};
}
