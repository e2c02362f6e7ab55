//! Identifier grammar: `{prefix}-g{NN}-{digits}`.
//!
//! `NN` is the zero-padded 1-based group number. The trailing digits are the
//! source rank in the old scheme and the source row position in the new one.

use regex::Regex;

use crate::error::{MigrateError, Result};
use crate::types::Entry;

/// Naming scheme shared by the old and new identifiers.
#[derive(Debug, Clone)]
pub struct IdScheme {
    prefix: String,
    group_size: usize,
    pattern: Regex,
}

impl IdScheme {
    pub fn new(prefix: &str, group_size: usize) -> Result<Self> {
        if prefix.is_empty() {
            return Err(MigrateError::InvalidConfig("prefix must not be empty".into()));
        }
        if group_size == 0 {
            return Err(MigrateError::InvalidConfig(
                "group_size must be at least 1".into(),
            ));
        }
        let pattern = Regex::new(&format!(r"^{}-g([0-9]{{2,}})-([0-9]+)$", regex::escape(prefix)))
            .map_err(|e| MigrateError::InvalidConfig(format!("identifier pattern: {e}")))?;

        Ok(Self {
            prefix: prefix.to_string(),
            group_size,
            pattern,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Group for the entry at 0-based sequence index `index`.
    pub fn group_of(&self, index: usize) -> u32 {
        (index / self.group_size) as u32 + 1
    }

    pub fn format(&self, group: u32, disambiguator: u64) -> String {
        format!("{}-g{:02}-{}", self.prefix, group, disambiguator)
    }

    /// Rank-based identifier. May collide inside a group.
    pub fn old_id(&self, group: u32, entry: &Entry) -> String {
        self.format(group, entry.source_rank)
    }

    /// Row-based identifier. Unique across the corpus.
    pub fn new_id(&self, group: u32, entry: &Entry) -> String {
        self.format(group, entry.source_row_position)
    }

    /// Whether `text` is exactly an identifier of this scheme.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Group number embedded in an identifier.
    pub fn group_in(&self, text: &str) -> Option<u32> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}
