//! Command implementations for bulk-cli

pub mod diff;
pub mod init;
pub mod list;
pub mod pull;
pub mod push;
pub mod reset;
pub mod status;

pub use diff::run_diff;
pub use init::run_init;
pub use list::run_list;
pub use pull::run_pull;
pub use push::run_push;
pub use reset::run_reset;
pub use status::run_status;

use colored::Colorize;

use bulk_core::{ChangeKind, MatchExpr, SyncEngine, SyncReport};

use crate::error::{CliError, Result};

/// Parse an optional `--match` expression.
fn parse_match(expr: Option<&str>) -> Result<Option<MatchExpr>> {
    Ok(expr.map(MatchExpr::parse).transpose()?)
}

/// Whether `path` passes the optional match expression.
///
/// Files whose content cannot be read or parsed never match.
fn is_selected(engine: &SyncEngine, matcher: Option<&MatchExpr>, path: &str) -> bool {
    match matcher {
        None => true,
        Some(expr) => engine
            .document(path)
            .is_some_and(|doc| expr.matches(&doc)),
    }
}

fn kind_marker(kind: ChangeKind) -> colored::ColoredString {
    match kind {
        ChangeKind::Added => "+".green(),
        ChangeKind::Modified => "~".yellow(),
        ChangeKind::Removed => "-".red(),
    }
}

/// Print a pull or push report and turn per-file failures into an error.
fn finish(report: &SyncReport, done: &str) -> Result<()> {
    if report.up_to_date {
        println!("{} Already up to date.", "OK".green().bold());
        return Ok(());
    }

    for action in &report.actions {
        println!("   {} {}", "+".green(), action);
    }
    for skipped in &report.skipped {
        println!(
            "   {} {}: {}",
            "!".yellow(),
            skipped.path.cyan(),
            skipped.message.yellow()
        );
    }

    if report.is_success() {
        println!("{} {}", "OK".green().bold(), done);
        return Ok(());
    }

    println!();
    println!("{}", "Errors:".red().bold());
    for error in &report.errors {
        println!("   {} {}: {}", "!".red(), error.path.cyan(), error.message);
    }
    Err(CliError::Incomplete {
        failed: report.errors.len(),
    })
}
