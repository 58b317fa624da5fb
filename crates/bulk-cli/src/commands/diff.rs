//! Diff command implementation
//!
//! Local mode compares the cached snapshot with the working file. Remote
//! mode compares the cached snapshot with the live resource and changes
//! nothing on disk.

use std::path::Path;

use colored::Colorize;
use similar::TextDiff;

use bulk_core::{Change, ChangeKind, SyncEngine};

use crate::cli::ClientArgs;
use crate::context;
use crate::error::Result;

/// Run the diff command
pub fn run_diff(
    cwd: &Path,
    paths: &[String],
    match_expr: Option<&str>,
    remote: bool,
    args: &ClientArgs,
) -> Result<()> {
    let (root, mut engine) = context::open_checkout(cwd, args)?;
    let matcher = super::parse_match(match_expr)?;
    let wanted = paths
        .iter()
        .map(|p| context::checkout_path(&root, cwd, p))
        .collect::<Result<Vec<_>>>()?;

    let changes = if remote {
        engine.status()?.remote
    } else {
        engine.local_changes()?
    };
    let changes: Vec<Change> = changes
        .into_iter()
        .filter(|c| wanted.is_empty() || wanted.iter().any(|w| w == c.path()))
        .filter(|c| super::is_selected(&engine, matcher.as_ref(), c.path()))
        .collect();

    if changes.is_empty() {
        println!("{} No changes.", "OK".green().bold());
        return Ok(());
    }

    for change in &changes {
        let (old, new) = if remote {
            remote_sides(&engine, change)?
        } else {
            local_sides(&engine, change)
        };
        print_diff(&unified_diff(change.path(), &old, &new));
    }
    Ok(())
}

fn text(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Cached snapshot against the working file.
fn local_sides(engine: &SyncEngine, change: &Change) -> (String, String) {
    let store = engine.store();
    let old = match change.kind {
        ChangeKind::Added => String::new(),
        _ => change.record.cached(store).map(text).unwrap_or_default(),
    };
    let new = match change.kind {
        ChangeKind::Removed => String::new(),
        _ => store.read(change.path()).map(text).unwrap_or_default(),
    };
    (old, new)
}

/// Cached snapshot against the live remote body.
fn remote_sides(engine: &SyncEngine, change: &Change) -> Result<(String, String)> {
    let old = match change.kind {
        ChangeKind::Added => String::new(),
        _ => change
            .record
            .cached(engine.store())
            .map(text)
            .unwrap_or_default(),
    };
    let new = match change.kind {
        ChangeKind::Removed => String::new(),
        _ => text(engine.fetch_remote(change.path())?),
    };
    Ok((old, new))
}

/// Unified diff of two texts with `a/` and `b/` headers.
pub fn unified_diff(path: &str, old: &str, new: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}

fn print_diff(diff: &str) {
    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else {
            println!("{line}");
        }
    }
}
