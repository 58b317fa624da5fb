//! Per-resource synchronization state

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use bulk_fs::{BulkPath, FileStore};
use bulk_http::{HttpClient, ParsedResponse, Request};

use crate::canonical;
use crate::{Error, Result};

/// State tracked for one remote resource.
///
/// `version_local == version_remote` means the local copy was derived from
/// the remote state seen at the last index refresh. Whether the working file
/// was edited since is only known through `hash`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Checkout-relative working path
    pub path: String,
    /// Absolute resource URL
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// Version seen in the latest listing; empty when not listed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version_remote: String,
    /// Version the local copy came from; empty when never fetched
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version_local: String,
    /// Digest of the canonical working content last written by us
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Location of the cached remote snapshot.
    pub fn cache_path(&self) -> String {
        BulkPath::cache_for(&self.path)
    }

    /// Attach the conditional header for a write: `If-Match` when an ETag
    /// is known, else `If-Unmodified-Since`, else nothing.
    pub fn conditional(&self, request: Request) -> Request {
        if let Some(etag) = &self.etag {
            request.with_header("If-Match", etag.as_str())
        } else if let Some(last_modified) = &self.last_modified {
            request.with_header("If-Unmodified-Since", last_modified.as_str())
        } else {
            request
        }
    }

    fn get(&self, client: &dyn HttpClient) -> Result<ParsedResponse> {
        debug!(path = %self.path, url = %self.url, "fetching");
        let response = client.send(&Request::get(&self.url))?;
        if !response.is_success() {
            return Err(Error::HttpStatus {
                method: "GET".to_string(),
                url: self.url.clone(),
                status: response.status,
            });
        }
        Ok(response.parse()?)
    }

    /// Download the resource and refresh the cached snapshot.
    ///
    /// Captures `ETag`, `Last-Modified` and a schema hint (`describedby`
    /// link, else a `$schema` body field), marks the local version as
    /// current and returns the canonical body. The working file is not
    /// touched.
    pub fn fetch(&mut self, store: &dyn FileStore, client: &dyn HttpClient) -> Result<Vec<u8>> {
        let response = self.get(client)?;

        if let Some(etag) = response.header("etag") {
            self.etag = Some(etag.to_string());
        }
        if let Some(last_modified) = response.header("last-modified") {
            self.last_modified = Some(last_modified.to_string());
        }
        if let Some(schema) = response.link("describedby") {
            self.schema = Some(schema.to_string());
        } else if let Some(schema) = response.body.get("$schema").and_then(Value::as_str) {
            self.schema = Some(schema.to_string());
        }

        let body = canonical::to_canonical(&response.body)?;
        self.version_local = self.version_remote.clone();
        store.write(&self.cache_path(), &body)?;
        Ok(body)
    }

    /// Canonical remote body, without touching the record or the cache.
    pub fn peek(&self, client: &dyn HttpClient) -> Result<Vec<u8>> {
        let response = self.get(client)?;
        canonical::to_canonical(&response.body)
    }

    /// Write content to the working path and make it the new baseline.
    pub fn write(&mut self, store: &dyn FileStore, content: &[u8]) -> Result<()> {
        self.hash = Some(canonical::content_hash(content));
        store.write(&self.path, content)?;
        Ok(())
    }

    /// Whether the working file differs from the last written baseline.
    ///
    /// Without a baseline nothing is considered changed. An unreadable
    /// working file counts as changed unless `ignore_deleted` is set.
    pub fn is_changed_local(&self, store: &dyn FileStore, ignore_deleted: bool) -> bool {
        let Some(hash) = &self.hash else {
            return false;
        };
        match store.read(&self.path) {
            Ok(content) => canonical::content_hash(&content) != *hash,
            Err(_) => !ignore_deleted,
        }
    }

    /// The cached remote snapshot.
    pub fn cached(&self, store: &dyn FileStore) -> Result<Vec<u8>> {
        store.read(&self.cache_path()).map_err(|e| {
            if e.is_not_found() {
                Error::NoCachedCopy {
                    path: self.path.clone(),
                }
            } else {
                Error::Fs(e)
            }
        })
    }

    /// Overwrite the working file with the cached snapshot.
    pub fn reset(&mut self, store: &dyn FileStore) -> Result<()> {
        let cached = self.cached(store)?;
        self.write(store, &cached)
    }
}
