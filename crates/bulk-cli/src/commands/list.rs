//! List command implementation

use std::path::Path;

use colored::Colorize;

use bulk_core::FileRecord;

use crate::cli::ClientArgs;
use crate::context;
use crate::error::Result;

/// Run the list command
///
/// Lists tracked records, including files missing locally. Offline.
pub fn run_list(cwd: &Path, match_expr: Option<&str>, json: bool, args: &ClientArgs) -> Result<()> {
    let (_, engine) = context::open_checkout(cwd, args)?;
    let matcher = super::parse_match(match_expr)?;

    let records: Vec<&FileRecord> = engine
        .collect_files(true)?
        .iter()
        .filter_map(|path| engine.meta().files.get(path))
        .filter(|record| super::is_selected(&engine, matcher.as_ref(), &record.path))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "No tracked files.".dimmed());
        return Ok(());
    }
    for record in records {
        let version = if record.version_local.is_empty() {
            "-"
        } else {
            record.version_local.as_str()
        };
        print!("{}  {}  {}", record.path.cyan(), version.yellow(), record.url.dimmed());
        if let Some(schema) = &record.schema {
            print!("  {}", schema.dimmed());
        }
        println!();
    }
    Ok(())
}
