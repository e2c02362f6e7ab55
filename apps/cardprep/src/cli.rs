//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "cardprep",
    version,
    about = "Migrate flashcard identifiers from rank-based to row-based names"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings shared by every subcommand.
///
/// Each flag overrides both the config file and the matching `CARDPREP_*`
/// variable, which figment reads in `config`.
#[derive(Debug, Default, Args)]
pub struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, global = true, env = "CARDPREP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Ranked source corpus (TSV)
    #[arg(long, global = true)]
    pub source: Option<PathBuf>,

    /// Directory of card (record) files
    #[arg(long, global = true)]
    pub records: Option<PathBuf>,

    /// Directory of lesson (group) files
    #[arg(long, global = true)]
    pub groups: Option<PathBuf>,

    /// Identifier prefix
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Entries per lesson
    #[arg(long, global = true)]
    pub group_size: Option<usize>,

    /// Keep only the first N entries
    #[arg(long, global = true, conflicts_with = "all_entries")]
    pub max_entries: Option<usize>,

    /// Keep every entry of the corpus
    #[arg(long, global = true)]
    pub all_entries: bool,

    /// Print the report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rewrite card and lesson identifiers in place
    Migrate {
        /// Compute and report changes without writing any file
        #[arg(long)]
        dry_run: bool,
    },
    /// List rank collisions without touching any file
    Collisions,
    /// Check that lesson memberships exist as cards, in the same order
    Verify,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_migrate_with_globals() {
        let cli = Cli::try_parse_from([
            "cardprep",
            "migrate",
            "--dry-run",
            "--prefix",
            "jlpt",
            "--group-size",
            "10",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Migrate { dry_run: true }));
        assert_eq!(cli.global.prefix.as_deref(), Some("jlpt"));
        assert_eq!(cli.global.group_size, Some(10));
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["cardprep", "verify", "-v", "-q"]);
        assert!(result.is_err());
    }

    #[test]
    fn max_entries_conflicts_with_all_entries() {
        let result =
            Cli::try_parse_from(["cardprep", "collisions", "--max-entries", "5", "--all-entries"]);
        assert!(result.is_err());
    }

    #[test]
    fn verify_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
