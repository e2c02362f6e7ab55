pub mod cli;
pub mod config;
pub mod report;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::report::CollisionSummary;

/// Exit code when `verify` finds inconsistencies.
const EXIT_INCONSISTENT: u8 = 2;

pub fn run() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.global)?;

    let config = config::load(&cli.global)?;
    let json = cli.global.json;

    match cli.command {
        Commands::Migrate { dry_run } => {
            tracing::info!("Building ID mapping from {}...", config.source.path.display());
            let report = cardprep_core::run(&config, dry_run).context("migration aborted")?;
            if json {
                report::print_json(&report)?;
            } else {
                println!("{}", report::migration_text(&report));
            }
        }
        Commands::Collisions => {
            let mapping = cardprep_core::plan(&config).context("failed to build ID mapping")?;
            let summary = CollisionSummary::new(&mapping);
            if json {
                report::print_json(&summary)?;
            } else {
                println!("{}", report::collisions_text(&summary));
            }
        }
        Commands::Verify => {
            let report = cardprep_core::verify(&config).context("verification aborted")?;
            if json {
                report::print_json(&report)?;
            } else {
                println!("{}", report::verification_text(&report));
            }
            if !report.is_consistent() {
                return Ok(ExitCode::from(EXIT_INCONSISTENT));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(args: &GlobalArgs) -> anyhow::Result<()> {
    let level = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
