//! Pull and push orchestration
//!
//! - **engine**: [`SyncEngine`] owning the store, the HTTP client and the
//!   loaded [`Meta`](crate::Meta)
//! - **report**: per-command outcome with per-file failures

mod engine;
mod report;

pub use engine::{CheckoutOptions, Status, SyncEngine};
pub use report::{FileIssue, SyncReport};
