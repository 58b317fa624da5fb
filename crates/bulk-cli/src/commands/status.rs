//! Status command implementation

use std::path::Path;

use colored::Colorize;

use bulk_core::{Change, Status};

use crate::cli::ClientArgs;
use crate::context;
use crate::error::Result;

/// Run the status command
pub fn run_status(
    cwd: &Path,
    match_expr: Option<&str>,
    json: bool,
    args: &ClientArgs,
) -> Result<()> {
    let (_, mut engine) = context::open_checkout(cwd, args)?;
    let matcher = super::parse_match(match_expr)?;

    let mut status = engine.status()?;
    if matcher.is_some() {
        status.retain(|change| super::is_selected(&engine, matcher.as_ref(), change.path()));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_status(&status);
    }
    Ok(())
}

fn print_status(status: &Status) {
    if status.is_clean() {
        println!("{} Nothing to sync.", "OK".green().bold());
        return;
    }
    print_section("Local changes", &status.local, "restbulk push");
    print_section("Remote changes", &status.remote, "restbulk pull");
}

fn print_section(title: &str, changes: &[Change], hint: &str) {
    if changes.is_empty() {
        return;
    }
    println!("{} ({} to apply):", title.bold(), hint.cyan());
    for change in changes {
        println!(
            "   {} {:<9} {}",
            super::kind_marker(change.kind),
            change.kind.to_string(),
            change.path()
        );
    }
    println!();
}
