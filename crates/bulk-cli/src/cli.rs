//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// restbulk - Check out a REST collection as local JSON files and sync it back
#[derive(Parser, Debug)]
#[command(name = "restbulk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub client: ClientArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// HTTP client overrides shared by all commands
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientArgs {
    /// Extra request header, repeatable
    #[arg(short = 'H', long = "header", global = true, value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "RESTBULK_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Check out a remote listing into a directory
    ///
    /// Examples:
    ///   restbulk init https://api.example.com/items
    ///   restbulk init https://api.example.com/items items/
    ///   restbulk init https://api.example.com/users --filter data --url-template '/users/{id}'
    Init {
        /// Listing URL
        url: String,

        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Dotted path to the entry array inside the listing body
        #[arg(long)]
        filter: Option<String>,

        /// Template for entries without a URL field
        #[arg(long)]
        url_template: Option<String>,
    },

    /// List tracked files
    List {
        /// Only files whose content matches the expression
        #[arg(short, long = "match", value_name = "EXPR")]
        match_expr: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show local and remote changes
    Status {
        /// Only files whose content matches the expression
        #[arg(short, long = "match", value_name = "EXPR")]
        match_expr: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show changes as unified diffs
    Diff {
        /// Files to diff (default: all changed files)
        paths: Vec<String>,

        /// Only files whose content matches the expression
        #[arg(short, long = "match", value_name = "EXPR")]
        match_expr: Option<String>,

        /// Diff remote changes against the live remote instead
        #[arg(long)]
        remote: bool,
    },

    /// Download remote changes
    Pull,

    /// Upload local changes
    Push,

    /// Discard local edits
    Reset {
        /// Files to reset (default: all locally modified or removed files)
        paths: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_client_args_after_subcommand() {
        let cli = Cli::parse_from([
            "restbulk",
            "pull",
            "-H",
            "Authorization: Bearer x",
            "--timeout",
            "5",
        ]);
        assert_eq!(cli.command, Some(Commands::Pull));
        assert_eq!(cli.client.headers, vec!["Authorization: Bearer x".to_string()]);
        assert_eq!(cli.client.timeout, Some(5));
    }

    #[test]
    fn parses_init_options() {
        let cli = Cli::parse_from([
            "restbulk",
            "init",
            "https://x.test/items",
            "out",
            "--filter",
            "data",
            "--url-template",
            "/items/{id}",
        ]);
        assert_eq!(
            cli.command,
            Some(Commands::Init {
                url: "https://x.test/items".to_string(),
                dir: PathBuf::from("out"),
                filter: Some("data".to_string()),
                url_template: Some("/items/{id}".to_string()),
            })
        );
    }

    #[test]
    fn parses_diff_with_match() {
        let cli = Cli::parse_from(["restbulk", "diff", "a.json", "--match", "id == 1", "--remote"]);
        assert_eq!(
            cli.command,
            Some(Commands::Diff {
                paths: vec!["a.json".to_string()],
                match_expr: Some("id == 1".to_string()),
                remote: true,
            })
        );
    }
}
