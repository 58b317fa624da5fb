//! Checkout metadata
//!
//! [`Meta`] is the durable state of one checkout: where the listing lives,
//! how to read it, and one [`FileRecord`] per tracked resource. It is saved
//! as pretty JSON at `.restbulk/meta.json` after every state-changing step,
//! so an interrupted command leaves metadata matching the work actually done.

mod record;

pub use record::FileRecord;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use bulk_fs::{BulkPath, FileStore};

use crate::Result;

/// Metadata for one checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Listing resource URL, fixed at init
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Dotted path selecting the entry array inside the listing body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Longest common URL prefix of all listed entries
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base: String,
    /// Template used to build an entry URL from its fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_template: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub files: BTreeMap<String, FileRecord>,
}

impl Meta {
    pub fn new(url: impl Into<String>, filter: Option<String>, url_template: Option<String>) -> Self {
        Self {
            url: url.into(),
            filter,
            url_template,
            ..Self::default()
        }
    }

    /// Load metadata from the store.
    ///
    /// A missing file yields empty metadata; callers decide whether that
    /// is fatal.
    pub fn load(store: &dyn FileStore) -> Result<Self> {
        let path = BulkPath::Meta.as_str();
        if !store.exists(path) {
            debug!(path, "no metadata file");
            return Ok(Self::default());
        }
        let content = store.read(path)?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Persist metadata to the store.
    pub fn save(&self, store: &dyn FileStore) -> Result<()> {
        let mut content = serde_json::to_vec_pretty(self)?;
        content.push(b'\n');
        store.write(BulkPath::Meta.as_str(), &content)?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        !self.url.is_empty()
    }

    /// Best-guess remote URL for an untracked local path.
    pub fn guess_url(&self, path: &str) -> String {
        let stem = path.strip_suffix(".json").unwrap_or(path);
        format!("{}{}", self.base, stem)
    }
}
