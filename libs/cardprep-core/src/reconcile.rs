//! Identifier reconciliation.
//!
//! Builds the two lookups used by the rewriter:
//! - a content map `(old_id, primary_text) -> new_id`, for files that carry
//!   the primary text next to the identifier;
//! - a positional map, the ordered `(old_id, new_id)` pairs of each group,
//!   for plain membership lists.
//!
//! Primary texts are assumed unique inside a collision set. This is not
//! checked: two colliding entries with the same text resolve to the later one.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::identifier::IdScheme;
use crate::types::{Collision, Entry, IdPair};

/// Identifier assignment for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub group: u32,
    pub old_id: String,
    pub new_id: String,
    pub primary_text: String,
}

/// Reconciled mapping between the old and new identifier schemes.
#[derive(Debug)]
pub struct IdMapping {
    scheme: IdScheme,
    assignments: Vec<Assignment>,
    /// old_id -> primary_text -> new_id
    content: HashMap<String, HashMap<String, String>>,
    /// new_id -> primary texts carrying it
    new_keys: HashMap<String, HashSet<String>>,
    positional: BTreeMap<u32, Vec<IdPair>>,
    collisions: Vec<Collision>,
}

/// Assign every entry to its group and derive both identifiers.
///
/// `entries` must already be in sequence order.
pub fn reconcile(entries: &[Entry], scheme: IdScheme) -> IdMapping {
    let mut assignments = Vec::with_capacity(entries.len());
    let mut content: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut new_keys: HashMap<String, HashSet<String>> = HashMap::new();
    let mut positional: BTreeMap<u32, Vec<IdPair>> = BTreeMap::new();

    for (idx, entry) in entries.iter().enumerate() {
        let group = scheme.group_of(idx);
        let old_id = scheme.old_id(group, entry);
        let new_id = scheme.new_id(group, entry);

        content
            .entry(old_id.clone())
            .or_default()
            .insert(entry.primary_text.clone(), new_id.clone());
        new_keys
            .entry(new_id.clone())
            .or_default()
            .insert(entry.primary_text.clone());
        positional.entry(group).or_default().push(IdPair {
            old_id: old_id.clone(),
            new_id: new_id.clone(),
        });

        assignments.push(Assignment {
            group,
            old_id,
            new_id,
            primary_text: entry.primary_text.clone(),
        });
    }

    let collisions = find_collisions(&assignments);
    for collision in &collisions {
        tracing::debug!(
            old_id = %collision.old_id,
            members = collision.members.len(),
            "rank collision"
        );
    }

    IdMapping {
        scheme,
        assignments,
        content,
        new_keys,
        positional,
        collisions,
    }
}

fn find_collisions(assignments: &[Assignment]) -> Vec<Collision> {
    let mut by_old: BTreeMap<(u32, &str), Vec<&Assignment>> = BTreeMap::new();
    for a in assignments {
        by_old.entry((a.group, a.old_id.as_str())).or_default().push(a);
    }

    by_old
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|((group, old_id), members)| Collision {
            old_id: old_id.to_string(),
            group,
            members: members
                .iter()
                .map(|a| (a.primary_text.clone(), a.new_id.clone()))
                .collect(),
        })
        .collect()
}

impl IdMapping {
    pub fn scheme(&self) -> &IdScheme {
        &self.scheme
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn entry_count(&self) -> usize {
        self.assignments.len()
    }

    /// Number of entries whose identifier changes.
    pub fn changed_count(&self) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.old_id != a.new_id)
            .count()
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Content-map lookup.
    pub fn resolve(&self, old_id: &str, primary_text: &str) -> Option<&str> {
        self.content
            .get(old_id)
            .and_then(|texts| texts.get(primary_text))
            .map(String::as_str)
    }

    /// Whether `(id, primary_text)` is already a new-scheme key.
    pub fn is_new_key(&self, id: &str, primary_text: &str) -> bool {
        self.new_keys
            .get(id)
            .is_some_and(|texts| texts.contains(primary_text))
    }

    /// Ordered pairs of one group.
    pub fn pairs(&self, group: u32) -> Option<&[IdPair]> {
        self.positional.get(&group).map(Vec::as_slice)
    }

    pub fn groups(&self) -> impl Iterator<Item = u32> + '_ {
        self.positional.keys().copied()
    }

    /// Identifiers of `group` that change.
    pub fn expected_changes(&self, group: u32) -> usize {
        self.pairs(group)
            .map(|pairs| pairs.iter().filter(|p| p.is_change()).count())
            .unwrap_or(0)
    }

    /// Changes of `group` already reflected in a file holding `ids`.
    pub fn settled_changes<S: AsRef<str>>(&self, group: u32, ids: &[S]) -> usize {
        let present: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();
        self.pairs(group)
            .map(|pairs| {
                pairs
                    .iter()
                    .filter(|p| p.is_change() && present.contains(p.new_id.as_str()))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Fresh positional cursor for one group file.
    pub fn cursor(&self, group: u32) -> PositionalCursor<'_> {
        PositionalCursor::new(self.pairs(group).unwrap_or(&[]))
    }
}

/// Outcome of consuming one physical occurrence from a positional cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positional<'a> {
    /// Next pair for this old identifier. May equal the old identifier.
    Replace(&'a str),
    /// Identifier is only known as a new-scheme identifier.
    AlreadyNew,
    /// Every pair for this old identifier has been consumed.
    Exhausted,
    /// Identifier is unknown to the group in both schemes.
    Unknown,
}

/// Per-file, per-old-identifier consumption state over a group's pairs.
///
/// The n-th occurrence of an old identifier in the file receives the n-th
/// pair carrying that old identifier, in sequence order.
#[derive(Debug)]
pub struct PositionalCursor<'a> {
    queues: HashMap<&'a str, (Vec<&'a str>, usize)>,
    new_ids: HashSet<&'a str>,
}

impl<'a> PositionalCursor<'a> {
    fn new(pairs: &'a [IdPair]) -> Self {
        let mut queues: HashMap<&'a str, (Vec<&'a str>, usize)> = HashMap::new();
        for pair in pairs {
            queues
                .entry(pair.old_id.as_str())
                .or_default()
                .0
                .push(pair.new_id.as_str());
        }
        let new_ids = pairs.iter().map(|p| p.new_id.as_str()).collect();
        Self { queues, new_ids }
    }

    pub fn next(&mut self, id: &str) -> Positional<'a> {
        match self.queues.get_mut(id) {
            Some((targets, consumed)) => match targets.get(*consumed) {
                Some(&target) => {
                    *consumed += 1;
                    Positional::Replace(target)
                }
                None => Positional::Exhausted,
            },
            None if self.new_ids.contains(id) => Positional::AlreadyNew,
            None => Positional::Unknown,
        }
    }

    pub fn is_old(&self, id: &str) -> bool {
        self.queues.contains_key(id)
    }

    pub fn is_new(&self, id: &str) -> bool {
        self.new_ids.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scheme() -> IdScheme {
        IdScheme::new("pfx", 15).unwrap()
    }

    #[test]
    fn two_entries_sharing_a_rank() {
        let entries = vec![Entry::new(1, 1, "X"), Entry::new(1, 2, "Y")];
        let mapping = reconcile(&entries, scheme());

        assert_eq!(mapping.resolve("pfx-g01-1", "X"), Some("pfx-g01-1"));
        assert_eq!(mapping.resolve("pfx-g01-1", "Y"), Some("pfx-g01-2"));
        assert_eq!(mapping.resolve("pfx-g01-1", "Z"), None);
        assert_eq!(mapping.changed_count(), 1);
        assert_eq!(
            mapping.pairs(1).unwrap(),
            &[
                IdPair {
                    old_id: "pfx-g01-1".into(),
                    new_id: "pfx-g01-1".into()
                },
                IdPair {
                    old_id: "pfx-g01-1".into(),
                    new_id: "pfx-g01-2".into()
                },
            ]
        );
    }

    #[test]
    fn collision_resolves_to_distinct_new_ids() {
        let mut entries: Vec<Entry> = (1..=13).map(|i| Entry::new(i, i, format!("w{i}"))).collect();
        entries.push(Entry::new(500, 501, "A"));
        entries.push(Entry::new(500, 743, "B"));
        let mapping = reconcile(&entries, scheme());

        let a = mapping.resolve("pfx-g01-500", "A").unwrap();
        let b = mapping.resolve("pfx-g01-500", "B").unwrap();
        assert_eq!(a, "pfx-g01-501");
        assert_eq!(b, "pfx-g01-743");

        let collisions = mapping.collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].old_id, "pfx-g01-500");
        assert_eq!(collisions[0].group, 1);
        assert_eq!(
            collisions[0].members,
            vec![
                ("A".to_string(), "pfx-g01-501".to_string()),
                ("B".to_string(), "pfx-g01-743".to_string()),
            ]
        );
    }

    #[test]
    fn new_ids_are_unique_across_groups() {
        let entries: Vec<Entry> = (0..47u64)
            .map(|i| Entry::new(i / 3, i + 1, format!("w{i}")))
            .collect();
        let mapping = reconcile(&entries, scheme());

        let new_ids: HashSet<&str> = mapping
            .assignments()
            .iter()
            .map(|a| a.new_id.as_str())
            .collect();
        assert_eq!(new_ids.len(), 47);
        assert_eq!(mapping.groups().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(mapping.pairs(4).unwrap().len(), 2);
    }

    #[test]
    fn same_rank_in_different_groups_is_no_collision() {
        let mut entries: Vec<Entry> = (1..=14).map(|i| Entry::new(i, i, format!("w{i}"))).collect();
        entries.push(Entry::new(20, 15, "last"));
        entries.push(Entry::new(20, 16, "first"));
        let mapping = reconcile(&entries, scheme());

        assert!(mapping.collisions().is_empty());
        assert_eq!(mapping.assignments()[14].old_id, "pfx-g01-20");
        assert_eq!(mapping.assignments()[15].old_id, "pfx-g02-20");
    }

    #[test]
    fn no_collision_means_no_change() {
        let entries: Vec<Entry> = (1..=5).map(|i| Entry::new(i, i, format!("w{i}"))).collect();
        let mapping = reconcile(&entries, scheme());
        assert_eq!(mapping.changed_count(), 0);
        assert_eq!(mapping.expected_changes(1), 0);
    }

    #[test]
    fn settled_changes_need_the_new_id() {
        let entries = vec![
            Entry::new(1, 1, "X"),
            Entry::new(1, 2, "Y"),
            Entry::new(2, 3, "Z"),
        ];
        let mapping = reconcile(&entries, scheme());
        assert_eq!(mapping.expected_changes(1), 2);
        assert_eq!(
            mapping.settled_changes(1, &["pfx-g01-1", "pfx-g01-2", "pfx-g01-3"]),
            2
        );
        assert_eq!(mapping.settled_changes(1, &["pfx-g01-1", "pfx-g01-3"]), 1);
        assert_eq!(mapping.settled_changes(2, &["pfx-g01-3"]), 0);
    }

    #[test]
    fn cursor_consumes_in_first_seen_order() {
        let entries = vec![
            Entry::new(1, 1, "X"),
            Entry::new(1, 2, "Y"),
            Entry::new(2, 3, "Z"),
        ];
        let mapping = reconcile(&entries, scheme());
        let mut cursor = mapping.cursor(1);

        assert_eq!(cursor.next("pfx-g01-1"), Positional::Replace("pfx-g01-1"));
        assert_eq!(cursor.next("pfx-g01-2"), Positional::Replace("pfx-g01-3"));
        assert_eq!(cursor.next("pfx-g01-1"), Positional::Replace("pfx-g01-2"));
        assert_eq!(cursor.next("pfx-g01-1"), Positional::Exhausted);
        assert_eq!(cursor.next("pfx-g01-3"), Positional::AlreadyNew);
        assert_eq!(cursor.next("pfx-g01-99"), Positional::Unknown);
    }

    #[test]
    fn cursor_for_unknown_group_knows_nothing() {
        let mapping = reconcile(&[Entry::new(1, 1, "X")], scheme());
        let mut cursor = mapping.cursor(9);
        assert_eq!(cursor.next("pfx-g09-1"), Positional::Unknown);
    }

    #[test]
    fn new_keys_pair_id_with_text() {
        let entries = vec![Entry::new(1, 1, "X"), Entry::new(1, 2, "Y")];
        let mapping = reconcile(&entries, scheme());
        assert!(mapping.is_new_key("pfx-g01-2", "Y"));
        assert!(!mapping.is_new_key("pfx-g01-2", "X"));
    }
}
