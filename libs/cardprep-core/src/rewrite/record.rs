//! Record file scanner.
//!
//! # Format
//! ```yaml
//! - id: ckw-g01-142
//!   prompt: "percent"
//!   answers:
//!     - パーセント
//!   hint: "noun/counter"
//! ```
//!
//! An identifier line is `- id: <ID>` at column 0. Its primary text is the
//! first item of the `answers:` list found within the look-ahead window.

use super::{join_lines, split_lines, Line, LineIssue, Rewritten};
use crate::identifier::IdScheme;
use crate::reconcile::IdMapping;
use crate::types::RecordSettings;

const ID_PREFIX: &str = "- id: ";

/// A record declaration found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLine<'a> {
    /// 0-based line index.
    pub index: usize,
    pub id: &'a str,
    pub primary_text: Option<&'a str>,
}

fn declared_id<'a>(body: &'a str, scheme: &IdScheme) -> Option<&'a str> {
    body.strip_prefix(ID_PREFIX).filter(|id| scheme.matches(id))
}

fn list_item(body: &str) -> Option<&str> {
    let trimmed = body.trim_start();
    if trimmed.len() == body.len() {
        return None;
    }
    trimmed.strip_prefix("- ").filter(|item| !item.is_empty())
}

fn primary_text<'a>(
    lines: &[Line<'a>],
    index: usize,
    scheme: &IdScheme,
    settings: &RecordSettings,
) -> Option<&'a str> {
    let end = (index + 1 + settings.lookahead).min(lines.len());
    for j in index + 1..end {
        let body = lines[j].body;
        if declared_id(body, scheme).is_some() {
            break;
        }
        let header = lines[j - 1].body.trim();
        if header.strip_suffix(':') == Some(settings.primary_field.as_str()) {
            if let Some(item) = list_item(body) {
                return Some(item);
            }
        }
    }
    None
}

fn scan<'a>(lines: &[Line<'a>], scheme: &IdScheme, settings: &RecordSettings) -> Vec<RecordLine<'a>> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| {
            declared_id(line.body, scheme).map(|id| RecordLine {
                index,
                id,
                primary_text: primary_text(lines, index, scheme, settings),
            })
        })
        .collect()
}

/// Record declarations of `content`, in file order.
pub fn find_records<'a>(
    content: &'a str,
    scheme: &IdScheme,
    settings: &RecordSettings,
) -> Vec<RecordLine<'a>> {
    scan(&split_lines(content), scheme, settings)
}

/// Rewrite record identifiers through the content map.
pub fn rewrite_records(content: &str, mapping: &IdMapping, settings: &RecordSettings) -> Rewritten {
    let lines = split_lines(content);
    let records = scan(&lines, mapping.scheme(), settings);

    let recognised: Vec<(&str, &str)> = records
        .iter()
        .filter_map(|r| r.primary_text.map(|text| (r.id, text)))
        .filter(|&(id, text)| mapping.resolve(id, text).is_some() || mapping.is_new_key(id, text))
        .collect();
    let already_migrated = !recognised.is_empty()
        && recognised
            .iter()
            .all(|&(id, text)| mapping.is_new_key(id, text));

    let recognised: Vec<String> = recognised.iter().map(|&(id, _)| id.to_string()).collect();

    if already_migrated {
        return Rewritten {
            content: content.to_string(),
            changes: 0,
            already_migrated,
            recognised,
            issues: Vec::new(),
        };
    }

    let mut replacements = Vec::new();
    let mut issues = Vec::new();

    for record in &records {
        let unresolved = || LineIssue::Unresolved {
            line: record.index + 1,
            id: record.id.to_string(),
        };
        let Some(text) = record.primary_text else {
            issues.push(unresolved());
            continue;
        };
        match mapping.resolve(record.id, text) {
            Some(new_id) if new_id != record.id => {
                replacements.push((record.index, format!("{ID_PREFIX}{new_id}")));
            }
            Some(_) => {}
            None if mapping.is_new_key(record.id, text) => {}
            None => issues.push(unresolved()),
        }
    }

    Rewritten {
        content: join_lines(&lines, &replacements),
        changes: replacements.len(),
        already_migrated,
        recognised,
        issues,
    }
}
