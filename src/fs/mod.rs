//! Read-only virtual filesystem
//!
//! A [`SingleRootStore`] serves one directory; an [`OverlayFileSystem`]
//! stacks any number of stores and resolves each lookup against the first
//! one that has the path.

mod overlay;
mod root;
mod stat;
mod store;

pub use overlay::{OverlayFileSystem, OverlayState};
pub use root::{SingleRootStore, StoreOptions};
pub use stat::{EntryKind, FileStat};
pub use store::{DirectoryHandle, InputStream, ReadSeek, Store};
