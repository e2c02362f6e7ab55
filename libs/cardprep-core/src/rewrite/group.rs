//! Group file scanner.
//!
//! # Format
//! ```yaml
//! title: Common Katakana 1
//! ids:
//!   - ckw-g01-142
//!   - ckw-g01-592
//! unlocks: '9999-12-31T23:59:59+00:00'
//! ```
//!
//! Membership lists carry no content, so identifiers are replaced through the
//! group's positional pairs. This assumes the list is still in generation
//! order; a manually reordered list is mismatched silently.

use std::collections::HashSet;

use super::{join_lines, split_lines, Line, LineIssue, Rewritten};
use crate::identifier::IdScheme;
use crate::reconcile::{IdMapping, Positional};
use crate::types::GroupSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    InsideMembershipList,
}

/// One identifier line inside a membership list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLine<'a> {
    /// 0-based line index.
    pub index: usize,
    pub indent: &'a str,
    pub id: &'a str,
}

fn member<'a>(body: &'a str, scheme: &IdScheme) -> Option<(&'a str, &'a str)> {
    let trimmed = body.trim_start();
    let indent_len = body.len() - trimmed.len();
    if indent_len == 0 {
        return None;
    }
    let id = trimmed.strip_prefix("- ")?;
    scheme
        .matches(id)
        .then(|| (&body[..indent_len + 2], id))
}

fn scan<'a>(lines: &[Line<'a>], scheme: &IdScheme, settings: &GroupSettings) -> Vec<MemberLine<'a>> {
    let header = format!("{}:", settings.section);
    let mut state = ScanState::Outside;
    let mut members = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let body = line.body;
        if body.trim().starts_with(&header) {
            state = ScanState::InsideMembershipList;
            continue;
        }
        if state == ScanState::Outside {
            continue;
        }
        if let Some((indent, id)) = member(body, scheme) {
            members.push(MemberLine { index, indent, id });
        } else if !body.trim().is_empty() && !body.starts_with(char::is_whitespace) {
            state = ScanState::Outside;
        }
    }
    members
}

/// Membership identifiers of `content`, in file order.
pub fn find_members<'a>(
    content: &'a str,
    scheme: &IdScheme,
    settings: &GroupSettings,
) -> Vec<MemberLine<'a>> {
    scan(&split_lines(content), scheme, settings)
}

/// Rewrite one group file through the positional pairs of `group`.
pub fn rewrite_group(
    content: &str,
    group: u32,
    mapping: &IdMapping,
    settings: &GroupSettings,
) -> Rewritten {
    let lines = split_lines(content);
    let members = scan(&lines, mapping.scheme(), settings);
    let mut cursor = mapping.cursor(group);

    let recognised: Vec<&str> = members
        .iter()
        .map(|m| m.id)
        .filter(|id| cursor.is_old(id) || cursor.is_new(id))
        .collect();
    let distinct: HashSet<&str> = recognised.iter().copied().collect();
    let already_migrated = !recognised.is_empty()
        && distinct.len() == recognised.len()
        && recognised.iter().all(|id| cursor.is_new(id));

    let recognised: Vec<String> = recognised.into_iter().map(str::to_string).collect();

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

    for m in &members {
        let line = m.index + 1;
        match cursor.next(m.id) {
            Positional::Replace(new_id) if new_id != m.id => {
                replacements.push((m.index, format!("{}{}", m.indent, new_id)));
            }
            Positional::Replace(_) | Positional::AlreadyNew => {}
            Positional::Exhausted => issues.push(LineIssue::Exhausted {
                line,
                id: m.id.to_string(),
            }),
            Positional::Unknown => issues.push(LineIssue::Unresolved {
                line,
                id: m.id.to_string(),
            }),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile;
    use crate::types::Entry;
    use pretty_assertions::assert_eq;

    fn mapping() -> IdMapping {
        let entries = vec![
            Entry::new(1, 1, "X"),
            Entry::new(1, 2, "Y"),
            Entry::new(2, 3, "Z"),
        ];
        reconcile(&entries, IdScheme::new("pfx", 15).unwrap())
    }

    fn lesson(ids: &[&str]) -> String {
        let members: String = ids.iter().map(|id| format!("  - {id}\n")).collect();
        format!("title: Lesson 1\n# generated\nids:\n{members}unlocks: '9999-12-31'\n")
    }

    #[test]
    fn replaces_repeated_old_ids_in_order() {
        let content = lesson(&["pfx-g01-1", "pfx-g01-1", "pfx-g01-2"]);
        let out = rewrite_group(&content, 1, &mapping(), &GroupSettings::default());

        assert_eq!(out.content, lesson(&["pfx-g01-1", "pfx-g01-2", "pfx-g01-3"]));
        assert_eq!(out.changes, 2);
        assert!(out.issues.is_empty());
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let content = lesson(&["pfx-g01-1", "pfx-g01-1", "pfx-g01-2"]);
        let first = rewrite_group(&content, 1, &mapping(), &GroupSettings::default());
        let second = rewrite_group(&first.content, 1, &mapping(), &GroupSettings::default());

        assert!(second.already_migrated);
        assert_eq!(second.changes, 0);
        assert_eq!(second.content, first.content);
    }

    #[test]
    fn extra_occurrence_exhausts_pairs() {
        let content = lesson(&["pfx-g01-1", "pfx-g01-1", "pfx-g01-1"]);
        let out = rewrite_group(&content, 1, &mapping(), &GroupSettings::default());

        assert_eq!(out.changes, 1);
        assert_eq!(
            out.issues,
            vec![LineIssue::Exhausted {
                line: 6,
                id: "pfx-g01-1".into()
            }]
        );
    }

    #[test]
    fn unknown_member_is_unresolved() {
        let content = lesson(&["pfx-g01-1", "pfx-g01-1", "pfx-g01-50"]);
        let out = rewrite_group(&content, 1, &mapping(), &GroupSettings::default());

        assert_eq!(out.changes, 1);
        assert_eq!(
            out.issues,
            vec![LineIssue::Unresolved {
                line: 6,
                id: "pfx-g01-50".into()
            }]
        );
    }

    #[test]
    fn ids_outside_the_section_are_untouched() {
        let content = "related:\n  - pfx-g01-1\nids:\n  - pfx-g01-1\n  - pfx-g01-1\nnext:\n  - pfx-g01-1\n";
        let out = rewrite_group(content, 1, &mapping(), &GroupSettings::default());
        assert_eq!(
            out.content,
            "related:\n  - pfx-g01-1\nids:\n  - pfx-g01-1\n  - pfx-g01-2\nnext:\n  - pfx-g01-1\n"
        );
    }

    #[test]
    fn blank_and_comment_lines_stay_inside() {
        let content = "ids:\n  - pfx-g01-1\n\n  # second\n  - pfx-g01-1\n";
        let members = find_members(content, mapping().scheme(), &GroupSettings::default());
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].index, 4);
        assert_eq!(members[1].indent, "  - ");
    }

    #[test]
    fn no_section_means_no_members() {
        let content = "title: x\n  - pfx-g01-1\n";
        let out = rewrite_group(content, 1, &mapping(), &GroupSettings::default());
        assert_eq!(out.content, content);
        assert!(!out.already_migrated);
    }

    #[test]
    fn group_without_pairs_warns() {
        let content = "ids:\n  - pfx-g02-1\n";
        let out = rewrite_group(content, 2, &mapping(), &GroupSettings::default());
        assert_eq!(out.changes, 0);
        assert_eq!(out.issues.len(), 1);
    }
}
