//! Reset command implementation

use std::path::Path;

use colored::Colorize;

use crate::cli::ClientArgs;
use crate::context;
use crate::error::Result;

/// Run the reset command
///
/// Paths are taken relative to `cwd`. With none, every locally modified or
/// removed file is restored.
pub fn run_reset(cwd: &Path, paths: &[String], args: &ClientArgs) -> Result<()> {
    let (root, mut engine) = context::open_checkout(cwd, args)?;
    let targets = paths
        .iter()
        .map(|p| context::checkout_path(&root, cwd, p))
        .collect::<Result<Vec<_>>>()?;

    let reset = engine.reset(&targets)?;
    if reset.is_empty() {
        println!("{} Nothing to reset.", "OK".green().bold());
        return Ok(());
    }
    for path in &reset {
        println!("   {} {}", "<".blue(), path);
    }
    println!("{} Reset {} file(s).", "OK".green().bold(), reset.len());
    Ok(())
}
