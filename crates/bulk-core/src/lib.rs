//! Bulk resource synchronization engine
//!
//! This crate checks out a remote collection of versioned JSON resources
//! into local files and reconciles independent local and remote edits:
//!
//! - **Metadata**: [`Meta`] and one [`FileRecord`] per tracked resource
//! - **Index refresh**: reconcile metadata against the remote listing
//! - **Change detection**: six-way local/remote classification
//! - **SyncEngine**: init, pull, push, reset and status
//!
//! # Architecture
//!
//! ```text
//!              bulk-cli
//!                  |
//!              bulk-core
//!                  |
//!          +-------+-------+
//!          |               |
//!       bulk-fs        bulk-http
//! ```
//!
//! The filesystem and HTTP layers are injected as trait objects, so the
//! whole engine runs against in-memory doubles in tests.

pub mod canonical;
pub mod changes;
pub mod entry;
pub mod error;
mod index;
pub mod json_path;
pub mod matcher;
pub mod meta;
pub mod sync;

pub use changes::{Change, ChangeKind, Side};
pub use error::{Error, Result};
pub use index::common_base;
pub use matcher::MatchExpr;
pub use meta::{FileRecord, Meta};
pub use sync::{CheckoutOptions, FileIssue, Status, SyncEngine, SyncReport};
