//! Change classification
//!
//! Compares tracked records and the working tree and sorts every
//! discrepancy into one of six buckets: local or remote, added, modified
//! or removed. A path may show up on both sides when both changed.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use bulk_fs::FileStore;

use crate::meta::{FileRecord, Meta};

/// Which side of the checkout changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Local,
    Remote,
}

/// What kind of change was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Removed => "removed",
        };
        f.write_str(label)
    }
}

/// A single detected change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub side: Side,
    pub kind: ChangeKind,
    pub record: FileRecord,
}

impl Change {
    fn new(side: Side, kind: ChangeKind, record: &FileRecord) -> Self {
        Self {
            side,
            kind,
            record: record.clone(),
        }
    }

    pub fn path(&self) -> &str {
        &self.record.path
    }
}

/// Classify `targets` against the tracked records.
///
/// `targets` is the working set of checkout-relative paths. Paths that are
/// not present in the store are treated as absent. Neither the metadata
/// nor the store is modified. Both lists come back sorted by path.
pub fn classify(meta: &Meta, store: &dyn FileStore, targets: &[String]) -> (Vec<Change>, Vec<Change>) {
    let present: BTreeSet<&str> = targets
        .iter()
        .map(String::as_str)
        .filter(|path| store.exists(path))
        .collect();

    let mut local = Vec::new();
    let mut remote = Vec::new();

    for path in &present {
        match meta.files.get(*path) {
            Some(record) => {
                if record.is_changed_local(store, false) {
                    local.push(Change::new(Side::Local, ChangeKind::Modified, record));
                }
                if record.version_remote.is_empty() {
                    remote.push(Change::new(Side::Remote, ChangeKind::Removed, record));
                } else if record.version_local != record.version_remote {
                    remote.push(Change::new(Side::Remote, ChangeKind::Modified, record));
                }
            }
            None => {
                let record = FileRecord::new(*path, meta.guess_url(path));
                local.push(Change::new(Side::Local, ChangeKind::Added, &record));
            }
        }
    }

    for record in meta.files.values() {
        if present.contains(record.path.as_str()) {
            continue;
        }
        if record.version_local.is_empty() {
            remote.push(Change::new(Side::Remote, ChangeKind::Added, record));
        } else {
            local.push(Change::new(Side::Local, ChangeKind::Removed, record));
        }
    }

    local.sort_by(|a, b| a.path().cmp(b.path()));
    remote.sort_by(|a, b| a.path().cmp(b.path()));
    (local, remote)
}
