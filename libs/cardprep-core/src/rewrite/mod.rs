//! In-place rewriting of record and group files.
//!
//! Files are never parsed as YAML. Each scanner works on a line view and only
//! replaces identifier lines, so everything else is kept byte-for-byte.

pub mod group;
pub mod record;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{MigrateError, Result, RewriteWarning};
use crate::reconcile::IdMapping;
use crate::types::MigrationConfig;

/// The two file collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Records,
    Groups,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Records => "records",
            Self::Groups => "groups",
        }
    }
}

/// Per-line anomaly found by a scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineIssue {
    Unresolved { line: usize, id: String },
    Exhausted { line: usize, id: String },
}

impl LineIssue {
    fn into_warning(self, file: &Path) -> RewriteWarning {
        let file = file.to_path_buf();
        match self {
            Self::Unresolved { line, id } => RewriteWarning::UnresolvedIdentifier { file, line, id },
            Self::Exhausted { line, id } => RewriteWarning::PositionalExhaustion { file, line, id },
        }
    }
}

/// Result of scanning one file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub content: String,
    pub changes: usize,
    /// Every recognised identifier already follows the new scheme.
    pub already_migrated: bool,
    /// Identifiers known to the mapping, in file order.
    pub recognised: Vec<String>,
    pub issues: Vec<LineIssue>,
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Rewritten,
    Unchanged,
    AlreadyMigrated,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub group: Option<u32>,
    pub changes: usize,
    pub status: FileStatus,
}

/// Outcome of rewriting one collection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionReport {
    pub files: Vec<FileReport>,
    pub total_changes: usize,
    pub warnings: Vec<RewriteWarning>,
}

/// A line split from its terminator, so `\r\n` files survive untouched.
pub(crate) struct Line<'a> {
    pub body: &'a str,
    pub cr: bool,
}

pub(crate) fn split_lines(content: &str) -> Vec<Line<'_>> {
    content
        .split('\n')
        .map(|raw| match raw.strip_suffix('\r') {
            Some(body) => Line { body, cr: true },
            None => Line { body: raw, cr: false },
        })
        .collect()
}

/// Join lines back, substituting `replacements[i]` for the body of line `i`.
pub(crate) fn join_lines(lines: &[Line<'_>], replacements: &[(usize, String)]) -> String {
    let mut out = String::new();
    let mut pending = replacements.iter().peekable();
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        match pending.peek() {
            Some((at, body)) if *at == idx => {
                out.push_str(body);
                pending.next();
            }
            _ => out.push_str(line.body),
        }
        if line.cr {
            out.push('\r');
        }
    }
    out
}

/// Group number carried by a file name: the trailing digits of its stem.
pub fn group_number(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    let start = stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    stem[start..].parse().ok()
}

/// Files of a collection directory with one of `extensions`, in path order.
pub fn list_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MigrateError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let io_err = |source| MigrateError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let wanted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e == ext));
        if wanted && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Applies a reconciled mapping to file collections.
pub struct Rewriter<'a> {
    mapping: &'a IdMapping,
    config: &'a MigrationConfig,
    dry_run: bool,
}

impl<'a> Rewriter<'a> {
    pub fn new(mapping: &'a IdMapping, config: &'a MigrationConfig) -> Self {
        Self {
            mapping,
            config,
            dry_run: false,
        }
    }

    /// Compute everything but write nothing.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Rewrite every file in order. Per-file failures are reported, not raised.
    pub fn rewrite_files(&self, files: &[PathBuf], collection: Collection) -> CollectionReport {
        let mut report = CollectionReport::default();
        for path in files {
            let file_report = self.rewrite_file(path, collection, &mut report.warnings);
            report.total_changes += file_report.changes;
            report.files.push(file_report);
        }
        tracing::info!(
            collection = collection.as_str(),
            files = report.files.len(),
            changes = report.total_changes,
            "collection done"
        );
        report
    }

    fn rewrite_file(
        &self,
        path: &Path,
        collection: Collection,
        warnings: &mut Vec<RewriteWarning>,
    ) -> FileReport {
        let group = group_number(path);
        let mut file_report = FileReport {
            path: path.to_path_buf(),
            group,
            changes: 0,
            status: FileStatus::Unchanged,
        };

        let mut warn = |warning: RewriteWarning| {
            tracing::warn!("{warning}");
            warnings.push(warning);
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn(RewriteWarning::FileFailed {
                    file: path.to_path_buf(),
                    message: format!("read failed: {e}"),
                });
                file_report.status = FileStatus::Failed;
                return file_report;
            }
        };

        let rewritten = match (collection, group) {
            (Collection::Records, _) => {
                record::rewrite_records(&content, self.mapping, &self.config.records)
            }
            (Collection::Groups, Some(group)) => {
                group::rewrite_group(&content, group, self.mapping, &self.config.groups)
            }
            (Collection::Groups, None) => {
                warn(RewriteWarning::UnnumberedFile {
                    file: path.to_path_buf(),
                });
                file_report.status = FileStatus::Skipped;
                return file_report;
            }
        };

        for issue in rewritten.issues {
            warn(issue.into_warning(path));
        }

        // Change-count audit. Only meaningful when the file maps to a group
        // the corpus actually produced. A migrated file has made its changes
        // already, so each changed pair must show up as its new identifier.
        if let Some(group) = group.filter(|g| self.mapping.pairs(*g).is_some()) {
            let expected = self.mapping.expected_changes(group);
            let actual = if rewritten.already_migrated {
                self.mapping.settled_changes(group, &rewritten.recognised)
            } else {
                rewritten.changes
            };
            if actual < expected {
                warn(RewriteWarning::UnderReplacement {
                    file: path.to_path_buf(),
                    expected,
                    actual,
                });
            }
        }

        if rewritten.already_migrated {
            tracing::debug!(file = %path.display(), "already migrated");
            file_report.status = FileStatus::AlreadyMigrated;
            return file_report;
        }

        if rewritten.changes == 0 {
            tracing::debug!(file = %path.display(), "no identifiers to update");
            return file_report;
        }

        file_report.changes = rewritten.changes;
        if self.dry_run {
            tracing::info!("  {}: {} IDs would be updated", display_name(path), rewritten.changes);
            file_report.status = FileStatus::Rewritten;
            return file_report;
        }

        match std::fs::write(path, &rewritten.content) {
            Ok(()) => {
                tracing::info!("  {}: {} IDs updated", display_name(path), rewritten.changes);
                file_report.status = FileStatus::Rewritten;
            }
            Err(e) => {
                warn(RewriteWarning::FileFailed {
                    file: path.to_path_buf(),
                    message: format!("write failed: {e}"),
                });
                file_report.changes = 0;
                file_report.status = FileStatus::Failed;
            }
        }
        file_report
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
