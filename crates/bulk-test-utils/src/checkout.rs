//! [`TestCheckout`]: a temporary checkout directory for restbulk tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use bulk_fs::OsFileStore;

/// A temporary directory with helpers for seeding and asserting on files.
///
/// # Example
///
/// ```rust,no_run
/// use bulk_test_utils::TestCheckout;
///
/// let checkout = TestCheckout::new();
/// checkout.write("a1.json", r#"{"id": "a1"}"#);
/// checkout.assert_file_contains("a1.json", "a1");
/// ```
pub struct TestCheckout {
    temp_dir: TempDir,
}

impl Default for TestCheckout {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCheckout {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// A filesystem store rooted at this directory.
    pub fn store(&self) -> OsFileStore {
        OsFileStore::new(self.root())
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.path(relative)).unwrap();
    }

    /// Parse `relative` as JSON.
    pub fn json(&self, relative: &str) -> serde_json::Value {
        serde_json::from_str(&self.read(relative)).unwrap()
    }

    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(
            !path.exists(),
            "Expected file NOT to exist: {}",
            path.display()
        );
    }

    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let actual = self.read(relative);
        assert!(
            actual.contains(content),
            "File {relative} does not contain expected content.\nExpected: {content}\nActual: {actual}"
        );
    }
}
