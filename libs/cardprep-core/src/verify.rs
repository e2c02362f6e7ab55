//! Cross-file consistency between group files and record files.
//!
//! Every identifier listed in a group file must be declared in the record file
//! with the same group number, and shared identifiers must appear in the same
//! relative order in both.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::identifier::IdScheme;
use crate::rewrite::{group, group_number, list_files, record};
use crate::types::MigrationConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Inconsistency {
    /// No record file carries the group file's number.
    MissingRecordFile { group_file: PathBuf, group: u32 },
    /// Listed identifier is not declared in the record file.
    MissingRecord {
        group_file: PathBuf,
        record_file: PathBuf,
        id: String,
    },
    /// Shared identifiers appear in a different order.
    OrderMismatch {
        group_file: PathBuf,
        record_file: PathBuf,
    },
    /// Group file name carries no group number.
    UnnumberedFile { group_file: PathBuf },
    Unreadable { file: PathBuf, message: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsistencyReport {
    pub group_files: usize,
    pub memberships: usize,
    pub problems: Vec<Inconsistency>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Check every group file under `config.groups_dir` against its record file.
pub fn verify(config: &MigrationConfig) -> Result<ConsistencyReport> {
    let scheme = IdScheme::new(&config.prefix, config.group_size)?;
    let record_files = list_files(&config.records_dir, &config.file_extensions)?;
    let group_files = list_files(&config.groups_dir, &config.file_extensions)?;

    let mut by_group: BTreeMap<u32, &Path> = BTreeMap::new();
    for path in &record_files {
        if let Some(n) = group_number(path) {
            by_group.entry(n).or_insert(path.as_path());
        }
    }

    let mut report = ConsistencyReport::default();
    for group_file in &group_files {
        report.group_files += 1;
        check_group_file(config, &scheme, group_file, &by_group, &mut report);
    }

    tracing::info!(
        group_files = report.group_files,
        problems = report.problems.len(),
        "verification done"
    );
    Ok(report)
}

fn read(path: &Path, report: &mut ConsistencyReport) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            report.problems.push(Inconsistency::Unreadable {
                file: path.to_path_buf(),
                message: e.to_string(),
            });
            None
        }
    }
}

fn check_group_file(
    config: &MigrationConfig,
    scheme: &IdScheme,
    group_file: &Path,
    by_group: &BTreeMap<u32, &Path>,
    report: &mut ConsistencyReport,
) {
    let Some(n) = group_number(group_file) else {
        report.problems.push(Inconsistency::UnnumberedFile {
            group_file: group_file.to_path_buf(),
        });
        return;
    };
    let Some(record_file) = by_group.get(&n).copied() else {
        report.problems.push(Inconsistency::MissingRecordFile {
            group_file: group_file.to_path_buf(),
            group: n,
        });
        return;
    };
    let Some(group_content) = read(group_file, report) else {
        return;
    };
    let Some(record_content) = read(record_file, report) else {
        return;
    };

    let members: Vec<&str> = group::find_members(&group_content, scheme, &config.groups)
        .into_iter()
        .map(|m| m.id)
        .collect();
    let records: Vec<&str> = record::find_records(&record_content, scheme, &config.records)
        .into_iter()
        .map(|r| r.id)
        .collect();
    report.memberships += members.len();

    let comparison = compare(&members, &records);
    for id in comparison.missing {
        report.problems.push(Inconsistency::MissingRecord {
            group_file: group_file.to_path_buf(),
            record_file: record_file.to_path_buf(),
            id: id.to_string(),
        });
    }
    if !comparison.same_order {
        report.problems.push(Inconsistency::OrderMismatch {
            group_file: group_file.to_path_buf(),
            record_file: record_file.to_path_buf(),
        });
    }
}

struct Comparison<'a> {
    missing: Vec<&'a str>,
    same_order: bool,
}

fn compare<'a>(members: &[&'a str], records: &[&'a str]) -> Comparison<'a> {
    let declared: HashSet<&str> = records.iter().copied().collect();
    let listed: HashSet<&str> = members.iter().copied().collect();

    let missing = members
        .iter()
        .copied()
        .filter(|id| !declared.contains(id))
        .collect();

    let shared_members = members.iter().filter(|id| declared.contains(*id));
    let shared_records = records.iter().filter(|id| listed.contains(*id));
    let same_order = shared_members.eq(shared_records);

    Comparison {
        missing,
        same_order,
    }
}
