//! Fixed locations inside a checkout.

use std::path::Path;

/// Well-known paths relative to the checkout root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkPath {
    /// The hidden `.restbulk` directory
    HiddenDir,
    /// Checkout metadata (`.restbulk/meta.json`)
    Meta,
    /// Root of the cached remote snapshots (`.restbulk/cache`)
    CacheDir,
    /// Optional HTTP client configuration (`.restbulk/config.toml`)
    ClientConfig,
}

impl BulkPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HiddenDir => ".restbulk",
            Self::Meta => ".restbulk/meta.json",
            Self::CacheDir => ".restbulk/cache",
            Self::ClientConfig => ".restbulk/config.toml",
        }
    }

    /// Path of the cached snapshot for a working-tree file.
    pub fn cache_for(path: &str) -> String {
        format!("{}/{}", Self::CacheDir.as_str(), path.trim_start_matches('/'))
    }

    /// Whether a relative path lives inside the hidden directory.
    pub fn is_hidden(path: &str) -> bool {
        let dir = Self::HiddenDir.as_str();
        path == dir || path.starts_with(&format!("{dir}/"))
    }
}

impl AsRef<Path> for BulkPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for BulkPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for BulkPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
