//! Filesystem capability for restbulk
//!
//! Provides the injectable [`FileStore`] used by the sync engine, atomic
//! writes, normalized paths and content checksums.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;
pub mod store;

pub use config::ConfigStore;
pub use constants::BulkPath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use store::{FileStore, MemoryFileStore, OsFileStore};
