//! Console reports.

use cardprep_core::{
    Collision, CollectionReport, ConsistencyReport, FileStatus, IdMapping, Inconsistency,
    MigrationReport,
};
use serde::Serialize;

/// Collision summary for `cardprep collisions`.
#[derive(Debug, Serialize)]
pub struct CollisionSummary<'a> {
    pub total_entries: usize,
    pub changed_identifiers: usize,
    pub collisions: &'a [Collision],
}

impl<'a> CollisionSummary<'a> {
    pub fn new(mapping: &'a IdMapping) -> Self {
        Self {
            total_entries: mapping.entry_count(),
            changed_identifiers: mapping.changed_count(),
            collisions: mapping.collisions(),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn collision_lines(collisions: &[Collision]) -> Vec<String> {
    let mut lines = Vec::new();
    if collisions.is_empty() {
        return lines;
    }
    lines.push(format!(
        "  Found {} duplicate rank-based IDs:",
        collisions.len()
    ));
    for c in collisions {
        lines.push(format!("    {} ({}x)", c.old_id, c.members.len()));
        for (text, new_id) in &c.members {
            lines.push(format!("      {text} -> {new_id}"));
        }
    }
    lines
}

pub fn collisions_text(summary: &CollisionSummary<'_>) -> String {
    let mut lines = vec![format!(
        "  {} total words, {} IDs will change",
        summary.total_entries, summary.changed_identifiers
    )];
    lines.extend(collision_lines(summary.collisions));
    lines.join("\n")
}

fn collection_lines(title: &str, report: &CollectionReport, dry_run: bool) -> Vec<String> {
    let verb = if dry_run { "would be updated" } else { "updated" };
    let mut lines = vec![format!("{title}:")];
    for file in report.files.iter().filter(|f| f.changes > 0) {
        let name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        lines.push(format!("  {name}: {} IDs {verb}", file.changes));
    }
    let migrated = report
        .files
        .iter()
        .filter(|f| f.status == FileStatus::AlreadyMigrated)
        .count();
    if migrated > 0 {
        lines.push(format!("  {migrated} files already migrated"));
    }
    lines.push(format!("  Total: {} IDs {verb}", report.total_changes));
    lines
}

pub fn migration_text(report: &MigrationReport) -> String {
    let mut lines = Vec::new();
    if report.dry_run {
        lines.push("Dry run: no files were written.".to_string());
    }
    lines.push(format!(
        "  {} total words, {} IDs will change",
        report.total_entries, report.changed_identifiers
    ));
    lines.extend(collision_lines(&report.collisions));
    lines.push(String::new());
    lines.extend(collection_lines("Card files", &report.records, report.dry_run));
    lines.push(String::new());
    lines.extend(collection_lines("Lesson files", &report.groups, report.dry_run));

    let warnings: Vec<String> = report.warnings().map(|w| format!("  {w}")).collect();
    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push(format!("Warnings ({}):", warnings.len()));
        lines.extend(warnings);
    }
    lines.join("\n")
}

fn describe(problem: &Inconsistency) -> String {
    match problem {
        Inconsistency::MissingRecordFile { group_file, group } => format!(
            "{}: no card file for lesson {group}",
            group_file.display()
        ),
        Inconsistency::MissingRecord {
            group_file,
            record_file,
            id,
        } => format!(
            "{}: {id} not found in {}",
            group_file.display(),
            record_file.display()
        ),
        Inconsistency::OrderMismatch {
            group_file,
            record_file,
        } => format!(
            "{}: order differs from {}",
            group_file.display(),
            record_file.display()
        ),
        Inconsistency::UnnumberedFile { group_file } => {
            format!("{}: no lesson number in file name", group_file.display())
        }
        Inconsistency::Unreadable { file, message } => {
            format!("{}: {message}", file.display())
        }
    }
}

pub fn verification_text(report: &ConsistencyReport) -> String {
    let mut lines = vec![format!(
        "Checked {} lesson files, {} memberships",
        report.group_files, report.memberships
    )];
    if report.is_consistent() {
        lines.push("  All lesson IDs exist as cards, in the same order.".to_string());
    } else {
        lines.push(format!("  {} problems:", report.problems.len()));
        lines.extend(report.problems.iter().map(|p| format!("    {}", describe(p))));
    }
    lines.join("\n")
}
