//! Push command implementation

use std::path::Path;

use colored::Colorize;

use crate::cli::ClientArgs;
use crate::context;
use crate::error::Result;

/// Run the push command
///
/// Files that fail to upload stay out of sync and make the command exit
/// non-zero.
pub fn run_push(cwd: &Path, args: &ClientArgs) -> Result<()> {
    let (_, mut engine) = context::open_checkout(cwd, args)?;
    println!(
        "{} Pushing to {}...",
        "=>".blue().bold(),
        engine.meta().url.cyan()
    );
    let report = engine.push()?;
    super::finish(&report, "Push complete.")
}
