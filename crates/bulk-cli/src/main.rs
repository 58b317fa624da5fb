//! restbulk CLI
//!
//! Checks out a remote REST collection as local JSON files and keeps the
//! two in sync.

mod cli;
mod commands;
mod context;
mod error;

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{ClientArgs, Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!("Verbose mode enabled");
        }
    }

    match cli.command {
        Some(cmd) => {
            let cwd = std::env::current_dir()?;
            execute_command(&cwd, cmd, &cli.client)
        }
        None => {
            println!("{} REST bulk sync", "restbulk".green().bold());
            println!();
            println!("Run {} for available commands.", "restbulk --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cwd: &Path, cmd: Commands, client: &ClientArgs) -> Result<()> {
    match cmd {
        Commands::Init {
            url,
            dir,
            filter,
            url_template,
        } => commands::run_init(&cwd.join(dir), &url, filter, url_template, client),
        Commands::List { match_expr, json } => {
            commands::run_list(cwd, match_expr.as_deref(), json, client)
        }
        Commands::Status { match_expr, json } => {
            commands::run_status(cwd, match_expr.as_deref(), json, client)
        }
        Commands::Diff {
            paths,
            match_expr,
            remote,
        } => commands::run_diff(cwd, &paths, match_expr.as_deref(), remote, client),
        Commands::Pull => commands::run_pull(cwd, client),
        Commands::Push => commands::run_push(cwd, client),
        Commands::Reset { paths } => commands::run_reset(cwd, &paths, client),
    }
}
