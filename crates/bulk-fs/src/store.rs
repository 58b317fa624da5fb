//! Injectable file storage for a checkout
//!
//! Every path handed to a [`FileStore`] is relative to the checkout root and
//! uses forward slashes. Paths that would escape the root are rejected.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::{Error, NormalizedPath, Result, io};

/// Storage capability used by the sync engine.
pub trait FileStore {
    /// Read a whole file.
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Write a whole file, creating parent directories as needed.
    fn write(&self, path: &str, content: &[u8]) -> Result<()>;

    /// Remove a file. Removing a missing file succeeds.
    fn remove(&self, path: &str) -> Result<()>;

    /// Whether a file exists.
    fn exists(&self, path: &str) -> bool;

    /// Every file below the root, relative and sorted.
    fn walk(&self) -> Result<Vec<String>>;
}

fn checked(path: &str) -> Result<NormalizedPath> {
    let normalized = NormalizedPath::new(path);
    if !normalized.is_contained() {
        return Err(Error::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(normalized)
}

/// A [`FileStore`] rooted at a directory on the real filesystem.
#[derive(Debug, Clone)]
pub struct OsFileStore {
    root: NormalizedPath,
}

impl OsFileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: NormalizedPath::new(root),
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<NormalizedPath> {
        let relative = checked(path)?;
        Ok(self.root.join(relative.as_str()))
    }

    fn walk_dir(&self, dir: &Path, out: &mut Vec<String>) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
            if file_type.is_dir() {
                self.walk_dir(&path, out)?;
            } else if file_type.is_file()
                && let Ok(relative) = path.strip_prefix(self.root.to_native())
            {
                out.push(NormalizedPath::new(relative).as_str().to_string());
            }
        }
        Ok(())
    }
}

impl FileStore for OsFileStore {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let native = self.resolve(path)?.to_native();
        fs::read(&native).map_err(|e| Error::io(native, e))
    }

    fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        let target = self.resolve(path)?;
        debug!(path, bytes = content.len(), "writing file");
        io::write_atomic(&target, content)
    }

    fn remove(&self, path: &str) -> Result<()> {
        let native = self.resolve(path)?.to_native();
        match fs::remove_file(&native) {
            Ok(()) => {
                debug!(path, "removed file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(native, e)),
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn walk(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        if self.root.exists() {
            self.walk_dir(&self.root.to_native(), &mut files)?;
        }
        files.sort();
        Ok(files)
    }
}

/// An in-memory [`FileStore`].
///
/// Clones share the same contents, so a test can keep a handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read a file as UTF-8 text, if present.
    pub fn read_string(&self, path: &str) -> Option<String> {
        self.files()
            .get(path)
            .map(|content| String::from_utf8_lossy(content).into_owned())
    }
}

impl FileStore for MemoryFileStore {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let key = checked(path)?;
        self.files()
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| Error::NotFound {
                path: path.to_string(),
            })
    }

    fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        let key = checked(path)?;
        self.files()
            .insert(key.as_str().to_string(), content.to_vec());
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<()> {
        let key = checked(path)?;
        self.files().remove(key.as_str());
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.files().contains_key(path)
    }

    fn walk(&self) -> Result<Vec<String>> {
        Ok(self.files().keys().cloned().collect())
    }
}

impl<T: FileStore + ?Sized> FileStore for Box<T> {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        (**self).read(path)
    }

    fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        (**self).write(path, content)
    }

    fn remove(&self, path: &str) -> Result<()> {
        (**self).remove(path)
    }

    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }

    fn walk(&self) -> Result<Vec<String>> {
        (**self).walk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryFileStore::new();
        store.write("items/a1.json", b"{}").unwrap();

        assert!(store.exists("items/a1.json"));
        assert_eq!(store.read("items/a1.json").unwrap(), b"{}");
        assert_eq!(store.walk().unwrap(), vec!["items/a1.json".to_string()]);
    }

    #[test]
    fn memory_store_missing_file_is_not_found() {
        let store = MemoryFileStore::new();
        let err = store.read("nope.json").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn memory_store_clones_share_contents() {
        let store = MemoryFileStore::new();
        let handle = store.clone();
        store.write("a.json", b"1").unwrap();
        assert_eq!(handle.read_string("a.json").as_deref(), Some("1"));
    }

    #[test]
    fn removing_missing_file_succeeds() {
        let store = MemoryFileStore::new();
        assert!(store.remove("ghost.json").is_ok());
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let store = MemoryFileStore::new();
        for path in ["../outside.json", "/etc/passwd", "a/../../b.json"] {
            let err = store.write(path, b"x").unwrap_err();
            assert!(matches!(err, Error::InvalidPath { .. }), "{path}");
        }
    }
}
