//! End-to-end migration run: load, reconcile, rewrite.

use serde::Serialize;

use crate::corpus;
use crate::error::{Result, RewriteWarning};
use crate::identifier::IdScheme;
use crate::reconcile::{reconcile, IdMapping};
use crate::rewrite::{list_files, Collection, CollectionReport, Rewriter};
use crate::types::{Collision, MigrationConfig};

/// Everything a run did, for the console report.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub dry_run: bool,
    pub total_entries: usize,
    pub changed_identifiers: usize,
    pub collisions: Vec<Collision>,
    pub records: CollectionReport,
    pub groups: CollectionReport,
}

impl MigrationReport {
    /// Identifiers replaced across both collections.
    pub fn total_changes(&self) -> usize {
        self.records.total_changes + self.groups.total_changes
    }

    pub fn warnings(&self) -> impl Iterator<Item = &RewriteWarning> {
        self.records.warnings.iter().chain(self.groups.warnings.iter())
    }
}

/// Load the corpus and build the mapping. Touches no target file.
pub fn plan(config: &MigrationConfig) -> Result<IdMapping> {
    let scheme = IdScheme::new(&config.prefix, config.group_size)?;
    let entries = corpus::load_configured(&config.source)?;
    let entries = corpus::order_entries(entries, config.sort_by_rank, config.max_entries);
    let mapping = reconcile(&entries, scheme);

    tracing::info!(
        entries = mapping.entry_count(),
        changed = mapping.changed_count(),
        collisions = mapping.collisions().len(),
        "built identifier mapping"
    );
    Ok(mapping)
}

/// Run the full migration.
///
/// Source and directory problems abort before any file is written. After
/// that, per-file anomalies are collected in the report.
pub fn run(config: &MigrationConfig, dry_run: bool) -> Result<MigrationReport> {
    let mapping = plan(config)?;
    let record_files = list_files(&config.records_dir, &config.file_extensions)?;
    let group_files = list_files(&config.groups_dir, &config.file_extensions)?;

    let rewriter = Rewriter::new(&mapping, config).dry_run(dry_run);

    tracing::info!("Updating card files...");
    let records = rewriter.rewrite_files(&record_files, Collection::Records);

    tracing::info!("Updating lesson files...");
    let groups = rewriter.rewrite_files(&group_files, Collection::Groups);

    Ok(MigrationReport {
        dry_run,
        total_entries: mapping.entry_count(),
        changed_identifiers: mapping.changed_count(),
        collisions: mapping.collisions().to_vec(),
        records,
        groups,
    })
}
