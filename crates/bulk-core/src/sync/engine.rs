//! SyncEngine implementation
//!
//! The engine owns the injected store and HTTP client together with the
//! loaded [`Meta`]. Metadata is saved after every state-changing step so an
//! interrupted pull or push leaves it consistent with the completed work.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use bulk_fs::{BulkPath, FileStore};
use bulk_http::{HttpClient, Request};

use crate::canonical;
use crate::changes::{self, Change, ChangeKind};
use crate::meta::{FileRecord, Meta};
use crate::{Error, Result};

use super::report::SyncReport;

/// Parameters of a new checkout
#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
    /// Listing resource URL
    pub url: String,
    /// Dotted path to the entry array inside the listing body
    pub filter: Option<String>,
    /// Template for entries without a URL field, e.g. `/users/{id}`
    pub url_template: Option<String>,
}

/// Local and remote changes of a checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    pub local: Vec<Change>,
    pub remote: Vec<Change>,
}

impl Status {
    pub fn is_clean(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }

    /// Keep only the changes satisfying `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&Change) -> bool) {
        self.local.retain(&mut keep);
        self.remote.retain(&mut keep);
    }
}

/// Engine for synchronizing a checkout with its remote collection
///
/// - **pull**: bring remote changes into the working tree
/// - **push**: upload local edits and delete locally removed resources
/// - **reset**: restore working files from the cached snapshots
pub struct SyncEngine {
    store: Box<dyn FileStore>,
    client: Box<dyn HttpClient>,
    meta: Meta,
}

impl SyncEngine {
    /// Create a checkout in `store` and pull every listed resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInitialized`] if metadata already exists, or
    /// any fatal listing error. Nothing is written in either case.
    pub fn init(
        store: Box<dyn FileStore>,
        client: Box<dyn HttpClient>,
        options: CheckoutOptions,
    ) -> Result<(Self, SyncReport)> {
        if Meta::load(store.as_ref())?.is_initialized() {
            return Err(Error::AlreadyInitialized {
                path: BulkPath::Meta.as_str().to_string(),
            });
        }

        let mut meta = Meta::new(options.url, options.filter, options.url_template);
        meta.refresh_index(client.as_ref())?;
        info!(url = %meta.url, entries = meta.files.len(), "initializing checkout");

        let mut engine = Self {
            store,
            client,
            meta,
        };
        engine.save()?;
        let report = engine.apply_remote()?;
        Ok((engine, report))
    }

    /// Open an existing checkout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotACheckout`] when the store holds no metadata.
    pub fn open(store: Box<dyn FileStore>, client: Box<dyn HttpClient>) -> Result<Self> {
        let meta = Meta::load(store.as_ref())?;
        if !meta.is_initialized() {
            return Err(Error::NotACheckout {
                path: BulkPath::Meta.as_str().to_string(),
            });
        }
        Ok(Self {
            store,
            client,
            meta,
        })
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn store(&self) -> &dyn FileStore {
        self.store.as_ref()
    }

    pub fn save(&self) -> Result<()> {
        self.meta.save(self.store.as_ref())
    }

    /// Refresh remote versions from the listing, in memory only.
    pub fn refresh_index(&mut self) -> Result<()> {
        self.meta.refresh_index(self.client.as_ref())
    }

    /// All JSON files of the working tree, sorted.
    ///
    /// With `include_deleted`, tracked paths missing locally are included.
    pub fn collect_files(&self, include_deleted: bool) -> Result<Vec<String>> {
        let mut files: BTreeSet<String> = self
            .store
            .walk()?
            .into_iter()
            .filter(|path| !BulkPath::is_hidden(path) && path.ends_with(".json"))
            .collect();
        if include_deleted {
            files.extend(
                self.meta
                    .files
                    .keys()
                    .filter(|path| !self.store.exists(path))
                    .cloned(),
            );
        }
        Ok(files.into_iter().collect())
    }

    /// Refresh the index, then classify `targets`.
    pub fn get_changed(&mut self, targets: &[String]) -> Result<(Vec<Change>, Vec<Change>)> {
        self.refresh_index()?;
        Ok(changes::classify(&self.meta, self.store.as_ref(), targets))
    }

    /// Local and remote changes of the whole working tree.
    pub fn status(&mut self) -> Result<Status> {
        let targets = self.collect_files(false)?;
        let (local, remote) = self.get_changed(&targets)?;
        Ok(Status { local, remote })
    }

    /// Local changes against the last known metadata, without any request.
    pub fn local_changes(&self) -> Result<Vec<Change>> {
        let targets = self.collect_files(false)?;
        let (local, _) = changes::classify(&self.meta, self.store.as_ref(), &targets);
        Ok(local)
    }

    /// Download every resource whose remote version moved.
    ///
    /// Files with local edits are never overwritten; their metadata and
    /// cached snapshot are still updated.
    pub fn pull(&mut self) -> Result<SyncReport> {
        self.refresh_index()?;
        self.apply_remote()
    }

    fn apply_remote(&mut self) -> Result<SyncReport> {
        let updates: Vec<FileRecord> = self
            .meta
            .files
            .values()
            .filter(|record| record.version_local != record.version_remote)
            .cloned()
            .collect();

        if updates.is_empty() {
            info!("already up to date");
            return Ok(SyncReport::up_to_date());
        }

        let mut report = SyncReport::default();
        for record in updates {
            if record.version_remote.is_empty() {
                self.drop_removed(record, &mut report)?;
            } else {
                self.pull_one(record, &mut report)?;
            }
        }

        self.save()?;
        info!(
            actions = report.actions.len(),
            skipped = report.skipped.len(),
            errors = report.errors.len(),
            "pull finished"
        );
        Ok(report)
    }

    fn drop_removed(&mut self, record: FileRecord, report: &mut SyncReport) -> Result<()> {
        let path = record.path.clone();
        self.meta.files.remove(&path);
        self.save()?;

        if record.is_changed_local(self.store.as_ref(), true) {
            self.discard_cache(&record);
            warn!(path = %path, "removed remotely, keeping local edits");
            report.skip(path, "removed remotely, keeping local edits");
            return Ok(());
        }

        let removed = self
            .store
            .remove(&path)
            .and_then(|()| self.store.remove(&record.cache_path()));
        match removed {
            Ok(()) => report.action(format!("removed {path}")),
            Err(e) => {
                warn!(path = %path, error = %e, "failed to remove");
                report.fail(path, e);
            }
        }
        Ok(())
    }

    fn pull_one(&mut self, mut record: FileRecord, report: &mut SyncReport) -> Result<()> {
        let path = record.path.clone();
        let body = match record.fetch(self.store.as_ref(), self.client.as_ref()) {
            Ok(body) => body,
            Err(e) => {
                warn!(path = %path, error = %e, "fetch failed");
                report.fail(path, e);
                return Ok(());
            }
        };
        self.meta.files.insert(path.clone(), record.clone());
        self.save()?;

        if record.is_changed_local(self.store.as_ref(), false) {
            warn!(path = %path, "skipping due to local edits");
            report.skip(path, "skipping due to local edits");
            return Ok(());
        }

        match record.write(self.store.as_ref(), &body) {
            Ok(()) => {
                debug!(path = %path, version = %record.version_local, "pulled");
                report.action(format!("pulled {path}"));
                self.meta.files.insert(path, record);
            }
            Err(e) => {
                warn!(path = %path, error = %e, "write failed");
                report.fail(path, e);
            }
        }
        Ok(())
    }

    /// Upload local additions and edits, delete local removals.
    ///
    /// Only files whose request succeeded are marked in sync afterwards;
    /// failed ones stay visibly out of sync.
    pub fn push(&mut self) -> Result<SyncReport> {
        let targets = self.collect_files(false)?;
        let (local, _) = self.get_changed(&targets)?;
        if local.is_empty() {
            info!("already up to date");
            return Ok(SyncReport::up_to_date());
        }

        let mut report = SyncReport::default();
        let mut success = BTreeSet::new();
        for change in local {
            let path = change.path().to_string();
            let outcome = match change.kind {
                ChangeKind::Added | ChangeKind::Modified => self.upload(change.record),
                ChangeKind::Removed => self.delete(change.record),
            };
            match outcome {
                Ok(()) => {
                    report.action(format!("pushed {} {path}", change.kind));
                    success.insert(path);
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "push failed");
                    report.fail(path, e);
                }
            }
        }

        self.refresh_index()?;
        for path in &success {
            if let Some(record) = self.meta.files.get_mut(path) {
                record.version_local = record.version_remote.clone();
            }
        }
        self.save()?;

        info!(
            pushed = success.len(),
            errors = report.errors.len(),
            "push finished"
        );
        Ok(report)
    }

    fn upload(&mut self, mut record: FileRecord) -> Result<()> {
        let body = self.store.read(&record.path)?;
        let request = record.conditional(Request::put(&record.url, body.clone()));
        debug!(path = %record.path, url = %record.url, "uploading");

        let response = self.client.send(&request)?;
        if response.status >= 400 {
            return Err(Error::HttpStatus {
                method: "PUT".to_string(),
                url: record.url,
                status: response.status,
            });
        }

        record.hash = Some(canonical::content_hash(&body));
        self.meta.files.insert(record.path.clone(), record.clone());

        let fetched = record.fetch(self.store.as_ref(), self.client.as_ref())?;
        record.write(self.store.as_ref(), &fetched)?;
        self.meta.files.insert(record.path.clone(), record);
        self.save()
    }

    fn delete(&mut self, record: FileRecord) -> Result<()> {
        let request = record.conditional(Request::delete(&record.url));
        debug!(path = %record.path, url = %record.url, "deleting");

        let response = self.client.send(&request)?;
        // Already gone counts as deleted.
        if response.status >= 400 && response.status != 404 && response.status != 410 {
            return Err(Error::HttpStatus {
                method: "DELETE".to_string(),
                url: record.url,
                status: response.status,
            });
        }

        self.meta.files.remove(&record.path);
        self.save()?;
        self.discard_cache(&record);
        Ok(())
    }

    /// Drop the cached snapshot of an untracked record. Failures are logged
    /// only: the record is already gone from the metadata.
    fn discard_cache(&self, record: &FileRecord) {
        if let Err(e) = self.store.remove(&record.cache_path()) {
            warn!(path = %record.path, error = %e, "failed to remove cached copy");
        }
    }

    /// Restore working files from their cached snapshots.
    ///
    /// With no paths, every locally modified or removed file is reset.
    /// Returns the paths that were reset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFile`] for an untracked path before anything
    /// is touched, and propagates local I/O errors.
    pub fn reset(&mut self, paths: &[String]) -> Result<Vec<String>> {
        let targets: Vec<String> = if paths.is_empty() {
            self.local_changes()?
                .into_iter()
                .filter(|change| change.kind != ChangeKind::Added)
                .map(|change| change.record.path)
                .collect()
        } else {
            if let Some(unknown) = paths.iter().find(|p| !self.meta.files.contains_key(*p)) {
                return Err(Error::UnknownFile {
                    path: unknown.clone(),
                });
            }
            paths.to_vec()
        };

        for path in &targets {
            if let Some(record) = self.meta.files.get_mut(path) {
                record.reset(self.store.as_ref())?;
                debug!(path = %path, "reset");
            }
        }
        self.save()?;
        Ok(targets)
    }

    /// Live canonical body of a tracked resource. Read-only.
    pub fn fetch_remote(&self, path: &str) -> Result<Vec<u8>> {
        let record = self.record(path)?;
        record.peek(self.client.as_ref())
    }

    pub fn record(&self, path: &str) -> Result<&FileRecord> {
        self.meta.files.get(path).ok_or_else(|| Error::UnknownFile {
            path: path.to_string(),
        })
    }

    /// Parsed content of a file: the working copy, else the cached snapshot.
    pub fn document(&self, path: &str) -> Option<Value> {
        let content = self.store.read(path).ok().or_else(|| {
            self.meta
                .files
                .get(path)
                .and_then(|record| record.cached(self.store.as_ref()).ok())
        })?;
        serde_json::from_slice(&content).ok()
    }
}
