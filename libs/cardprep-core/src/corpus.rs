//! Corpus loader for ranked frequency lists.
//!
//! # Format
//! Delimited text with a header row. Only the rank and primary text columns
//! are required, plus whatever column the row filter inspects:
//! ```text
//! rank	lemma	wType
//! 1	の	和
//! 142	パーセント	外
//! ```
//!
//! Fields are split on the raw delimiter and one physical line is one row.
//! Quote characters carry no meaning: a `"` is part of the field, and a
//! delimiter or newline inside quotes still splits. Frequency lists of this
//! kind are unquoted.

use std::collections::HashMap;

use crate::error::CorpusError;
use crate::types::{ColumnFilter, Entry, SourceSettings};

/// View over one data row of the source.
pub struct SourceRow<'a> {
    columns: &'a HashMap<&'a str, usize>,
    fields: Vec<&'a str>,
}

impl<'a> SourceRow<'a> {
    /// Field value by column name. `None` for unknown columns and short rows.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .get(column)
            .and_then(|&idx| self.fields.get(idx).copied())
    }
}

/// Predicate selecting which source rows become entries.
pub trait RowFilter {
    fn accepts(&self, row: &SourceRow<'_>) -> bool;

    /// Columns that must be present in the header.
    fn required_columns(&self) -> Vec<&str> {
        Vec::new()
    }
}

impl<F> RowFilter for F
where
    F: Fn(&SourceRow<'_>) -> bool,
{
    fn accepts(&self, row: &SourceRow<'_>) -> bool {
        self(row)
    }
}

impl RowFilter for ColumnFilter {
    fn accepts(&self, row: &SourceRow<'_>) -> bool {
        row.get(&self.column) == Some(self.equals.as_str())
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![self.column.as_str()]
    }
}

/// Accepts every row.
pub struct AcceptAll;

impl RowFilter for AcceptAll {
    fn accepts(&self, _row: &SourceRow<'_>) -> bool {
        true
    }
}

/// Read the source file named in `settings` and parse it.
pub fn load_entries(
    settings: &SourceSettings,
    filter: &dyn RowFilter,
) -> Result<Vec<Entry>, CorpusError> {
    let path = settings.path.as_path();
    if !path.exists() {
        return Err(CorpusError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let entries = parse_entries(&content, settings, filter)?;
    tracing::info!(
        path = %path.display(),
        entries = entries.len(),
        "loaded corpus"
    );
    Ok(entries)
}

/// Load using the filter configured in `settings`.
pub fn load_configured(settings: &SourceSettings) -> Result<Vec<Entry>, CorpusError> {
    match &settings.filter {
        Some(filter) => load_entries(settings, filter),
        None => load_entries(settings, &AcceptAll),
    }
}

/// Parse delimited content into entries, in source row order.
///
/// Row positions count every non-blank data row, accepted or not. Rows are
/// physical lines; quotes are not interpreted.
pub fn parse_entries(
    content: &str,
    settings: &SourceSettings,
    filter: &dyn RowFilter,
) -> Result<Vec<Entry>, CorpusError> {
    let delimiter = settings.delimiter;
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')));

    let header = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((_, line)) => break line.trim_start_matches('\u{feff}'),
            None => {
                return Err(CorpusError::SourceFormat {
                    line: 1,
                    message: "missing header row".into(),
                })
            }
        }
    };

    let columns: HashMap<&str, usize> = header
        .split(delimiter)
        .enumerate()
        .map(|(idx, name)| (name.trim(), idx))
        .collect();

    let mut required = vec![settings.rank_column.as_str(), settings.text_column.as_str()];
    required.extend(filter.required_columns());
    let missing: Vec<&str> = required
        .into_iter()
        .filter(|name| !columns.contains_key(name))
        .collect();
    if !missing.is_empty() {
        return Err(CorpusError::SourceFormat {
            line: 1,
            message: format!("missing required columns: {}", missing.join(", ")),
        });
    }

    let mut entries = Vec::new();
    let mut row_position = 0u64;

    for (line_num, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        row_position += 1;

        let row = SourceRow {
            columns: &columns,
            fields: line.split(delimiter).collect(),
        };
        if !filter.accepts(&row) {
            continue;
        }

        let rank_str = row.get(&settings.rank_column).unwrap_or("").trim();
        let source_rank = rank_str
            .parse::<u64>()
            .map_err(|_| CorpusError::SourceFormat {
                line: line_num,
                message: format!("invalid rank {rank_str:?}"),
            })?;

        let primary_text = row
            .get(&settings.text_column)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| CorpusError::SourceFormat {
                line: line_num,
                message: format!("empty {}", settings.text_column),
            })?;

        entries.push(Entry::new(source_rank, row_position, primary_text));
    }

    Ok(entries)
}

/// Put entries in grouping order and truncate.
///
/// The rank sort is stable, so tied ranks keep source row order.
pub fn order_entries(mut entries: Vec<Entry>, sort_by_rank: bool, max: Option<usize>) -> Vec<Entry> {
    if sort_by_rank {
        entries.sort_by_key(|entry| entry.source_rank);
    }
    if let Some(max) = max {
        entries.truncate(max);
    }
    entries
}
