//! Configuration layering using figment.
//!
//! Precedence (highest to lowest):
//! 1. Command-line flags
//! 2. `CARDPREP_*` environment variables (`.env` included), `__` as separator
//! 3. The TOML file given with `--config`
//! 4. Built-in defaults
//!
//! Figment maps `CARDPREP_SOURCE__DELIMITER` -> `source.delimiter`,
//! `CARDPREP_RECORDS__LOOKAHEAD` -> `records.lookahead`, and so on.

use anyhow::Context;
use cardprep_core::MigrationConfig;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::cli::GlobalArgs;

pub const ENV_PREFIX: &str = "CARDPREP_";

/// Build the provider chain for one invocation.
pub fn figment(args: &GlobalArgs) -> anyhow::Result<Figment> {
    let mut figment = Figment::from(Serialized::defaults(MigrationConfig::default()));

    if let Some(path) = &args.config {
        // Toml::file treats a missing file as empty.
        if !path.is_file() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        figment = figment.merge(Toml::file(path));
    }

    // `CARDPREP_CONFIG` names the file itself and is read by clap.
    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").ignore(&["config"]));

    Ok(merge_flags(figment, args))
}

fn merge_flags(mut figment: Figment, args: &GlobalArgs) -> Figment {
    if let Some(source) = &args.source {
        figment = figment.merge(Serialized::default("source.path", source));
    }
    if let Some(records) = &args.records {
        figment = figment.merge(Serialized::default("records_dir", records));
    }
    if let Some(groups) = &args.groups {
        figment = figment.merge(Serialized::default("groups_dir", groups));
    }
    if let Some(prefix) = &args.prefix {
        figment = figment.merge(Serialized::default("prefix", prefix));
    }
    if let Some(group_size) = args.group_size {
        figment = figment.merge(Serialized::default("group_size", group_size));
    }
    if let Some(max) = args.max_entries {
        figment = figment.merge(Serialized::default("max_entries", max));
    }
    figment
}

/// Effective configuration for one invocation.
pub fn load(args: &GlobalArgs) -> anyhow::Result<MigrationConfig> {
    let mut config: MigrationConfig = figment(args)?
        .extract()
        .context("invalid configuration")?;
    // Removes the cap rather than setting a value, so it is applied last.
    if args.all_entries {
        config.max_entries = None;
    }
    tracing::debug!(?config, "effective configuration");
    Ok(config)
}
