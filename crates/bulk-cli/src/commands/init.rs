//! Init command implementation
//!
//! Checks out a remote listing into a new directory.

use std::path::Path;

use colored::Colorize;

use bulk_core::{CheckoutOptions, SyncEngine};
use bulk_fs::OsFileStore;
use bulk_http::ReqwestClient;

use crate::cli::ClientArgs;
use crate::context;
use crate::error::Result;

/// Run the init command
///
/// Creates `dir` if needed, writes `.restbulk/meta.json` and pulls every
/// listed resource.
pub fn run_init(
    dir: &Path,
    url: &str,
    filter: Option<String>,
    url_template: Option<String>,
    args: &ClientArgs,
) -> Result<()> {
    println!(
        "{} Checking out {} into {}...",
        "=>".blue().bold(),
        url.cyan(),
        dir.display()
    );

    std::fs::create_dir_all(dir)?;
    let client = ReqwestClient::new(&context::client_config(dir, args)?)?;
    let (engine, report) = SyncEngine::init(
        Box::new(OsFileStore::new(dir)),
        Box::new(client),
        CheckoutOptions {
            url: url.to_string(),
            filter,
            url_template,
        },
    )?;

    println!(
        "   Tracking {} resources under {}",
        engine.meta().files.len().to_string().yellow(),
        engine.meta().base.dimmed()
    );
    super::finish(&report, "Checkout complete.")
}
