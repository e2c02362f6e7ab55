//! Core types for card identifier migration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One lexical unit from the source corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Frequency rank. Not unique: upstream ties share a rank.
    pub source_rank: u64,
    /// 1-based ordinal of the data row in the raw source. Unique.
    pub source_row_position: u64,
    /// Lexical form used to tell colliding entries apart.
    pub primary_text: String,
}

impl Entry {
    pub fn new(source_rank: u64, source_row_position: u64, primary_text: impl Into<String>) -> Self {
        Self {
            source_rank,
            source_row_position,
            primary_text: primary_text.into(),
        }
    }
}

/// Old and new identifier for a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdPair {
    pub old_id: String,
    pub new_id: String,
}

impl IdPair {
    pub fn is_change(&self) -> bool {
        self.old_id != self.new_id
    }
}

/// Entries sharing one old identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collision {
    pub old_id: String,
    pub group: u32,
    /// `(primary_text, new_id)` for every member, in sequence order.
    pub members: Vec<(String, String)>,
}

/// Equality filter on one source column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub column: String,
    pub equals: String,
}

/// Where and how to read the tabular corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub path: PathBuf,
    pub delimiter: char,
    pub rank_column: String,
    pub text_column: String,
    pub filter: Option<ColumnFilter>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("BCCWJ_frequencylist_suw_ver1_0.tsv"),
            delimiter: '\t',
            rank_column: "rank".to_string(),
            text_column: "lemma".to_string(),
            filter: Some(ColumnFilter {
                column: "wType".to_string(),
                equals: "外".to_string(),
            }),
        }
    }
}

/// Record file layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSettings {
    /// Key whose first list item is the primary text.
    pub primary_field: String,
    /// Lines scanned after an identifier line.
    pub lookahead: usize,
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            primary_field: "answers".to_string(),
            lookahead: 10,
        }
    }
}

/// Group file layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSettings {
    /// Section header that opens the membership list.
    pub section: String,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            section: "ids".to_string(),
        }
    }
}

/// Full migration configuration, passed explicitly to every stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub prefix: String,
    pub group_size: usize,
    pub max_entries: Option<usize>,
    pub sort_by_rank: bool,
    pub source: SourceSettings,
    pub records_dir: PathBuf,
    pub groups_dir: PathBuf,
    pub records: RecordSettings,
    pub groups: GroupSettings,
    pub file_extensions: Vec<String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            prefix: "ckw".to_string(),
            group_size: 15,
            max_entries: Some(15 * 40),
            sort_by_rank: true,
            source: SourceSettings::default(),
            records_dir: PathBuf::from("cards"),
            groups_dir: PathBuf::from("lessons"),
            records: RecordSettings::default(),
            groups: GroupSettings::default(),
            file_extensions: vec!["yaml".to_string(), "yml".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_katakana_layout() {
        let config = MigrationConfig::default();
        assert_eq!(config.prefix, "ckw");
        assert_eq!(config.group_size, 15);
        assert_eq!(config.max_entries, Some(600));
        assert_eq!(config.source.delimiter, '\t');
    }

    #[test]
    fn id_pair_change() {
        let same = IdPair {
            old_id: "ckw-g01-1".into(),
            new_id: "ckw-g01-1".into(),
        };
        let moved = IdPair {
            old_id: "ckw-g01-1".into(),
            new_id: "ckw-g01-2".into(),
        };
        assert!(!same.is_change());
        assert!(moved.is_change());
    }
}
