//! Pull command implementation

use std::path::Path;

use colored::Colorize;

use crate::cli::ClientArgs;
use crate::context;
use crate::error::Result;

/// Run the pull command
pub fn run_pull(cwd: &Path, args: &ClientArgs) -> Result<()> {
    let (_, mut engine) = context::open_checkout(cwd, args)?;
    println!(
        "{} Pulling from {}...",
        "=>".blue().bold(),
        engine.meta().url.cyan()
    );
    let report = engine.pull()?;
    super::finish(&report, "Pull complete.")
}
