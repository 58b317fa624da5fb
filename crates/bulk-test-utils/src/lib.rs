//! Shared test utilities for the restbulk workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`remote`]: [`FakeRemote`], an in-memory REST collection implementing
//!   [`HttpClient`](bulk_http::HttpClient)
//! - [`checkout`]: [`TestCheckout`], a temporary checkout directory with
//!   assertion helpers

pub mod checkout;
pub mod remote;

pub use checkout::TestCheckout;
pub use remote::{FakeRemote, ListingStyle};
